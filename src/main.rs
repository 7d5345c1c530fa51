//! Worms Duel native entry point
//!
//! Headless host: loads a map (or builds the demo arena), then lets two
//! scripted players fight it out through the same input, tick and audio
//! path a windowed host would use.
//!
//! ```text
//! worms-duel [MAP.json] [SEED]
//! worms-duel --export-demo OUT.json
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use glam::{IVec2, Vec2};
use worms_duel::audio::{AudioManager, LogSink};
use worms_duel::consts::{MAX_SUBSTEPS, SIM_DT};
use worms_duel::persistence;
use worms_duel::platform::{InputEvent, InputState, Key, MouseButton};
use worms_duel::sim::{MatchEvent, MatchPhase, MatchState, TerrainGrid, TileKind, predict_path, tick};
use worms_duel::Settings;

const SETTINGS_FILE: &str = "worms-duel.json";
const DEFAULT_SEED: u64 = 0x5EED;
/// Host frame time; deliberately off the 60 Hz tick to exercise the accumulator
const FRAME_DT: f32 = 1.0 / 50.0;
/// Give up after this many frames (20 minutes of play)
const MAX_FRAMES: u32 = 50 * 60 * 20;

/// Hill-and-valley arena with a spawner at each end
fn demo_arena() -> TerrainGrid {
    let mut grid = TerrainGrid::default();
    for x in 0..48i32 {
        // Central hill between the two players
        let surface = match x {
            18..=29 => 7 + (x - 23).abs() / 2,
            _ => 10,
        };
        grid.set_tile(IVec2::new(x, surface), TileKind::Grass, 0);
        for y in surface + 1..14 {
            grid.set_tile(IVec2::new(x, y), TileKind::Stone, 0);
        }
    }
    grid.set_tile(IVec2::new(4, 8), TileKind::Spawners, 0);
    grid.set_tile(IVec2::new(43, 8), TileKind::Spawners, 1);
    grid.place_offgrid(TileKind::Decor, 0, Vec2::new(150.0, 148.0));
    grid.place_offgrid(TileKind::LargeDecor, 1, Vec2::new(560.0, 130.0));
    grid.autotile();
    grid
}

/// Scripted opponent: walk a little, maybe switch weapon, aim at the other
/// player by searching preview paths, then fire.
#[derive(Default)]
struct Bot {
    /// Frames since the current turn became playable
    frames: u32,
    aim: Vec2,
    turns: u32,
}

impl Bot {
    fn drive(&mut self, state: &MatchState, input: &mut InputState, render_scale: f32) {
        if state.phase() != MatchPhase::Playing {
            if self.frames > 0 {
                self.turns += 1;
            }
            self.frames = 0;
            return;
        }
        self.frames += 1;

        let me = state.active_player();
        let foe = &state.players[1 - state.active];
        let toward = if foe.pos.x > me.pos.x { Key::Right } else { Key::Left };

        match self.frames {
            1 => input.handle(InputEvent::KeyDown(toward)),
            15 => {
                input.handle(InputEvent::KeyUp(Key::Left));
                input.handle(InputEvent::KeyUp(Key::Right));
                if self.turns % 3 == 2 {
                    input.handle(InputEvent::Wheel(1));
                }
            }
            30 => {
                self.aim = choose_aim(state);
                input.handle(InputEvent::MouseDown(MouseButton::Left));
            }
            31..=40 => {}
            41 => input.handle(InputEvent::MouseUp(MouseButton::Left)),
            _ => {}
        }

        // Keep the cursor on the chosen world point as the camera drifts
        let screen = (self.aim - state.camera.scroll) * render_scale;
        input.handle(InputEvent::CursorMoved(screen));
    }
}

/// Aim point whose predicted path ends closest to the opponent
fn choose_aim(state: &MatchState) -> Vec2 {
    let me = state.active_player();
    let foe = &state.players[1 - state.active];
    let origin = me.center();
    let target = foe.center();
    let side = if target.x >= origin.x { 1.0 } else { -1.0 };
    let max_force = me.weapon.spec().max_force;

    let mut best = (f32::MAX, origin + Vec2::new(side * 50.0, -50.0));
    for degrees in (10..=80).step_by(5) {
        let angle = (degrees as f32).to_radians();
        let dir = Vec2::new(side * angle.cos(), -angle.sin());
        for step in 1..=15 {
            let aim = origin + dir * (max_force * step as f32 / 15.0);
            let path = predict_path(&state.terrain, origin, aim, me.weapon, state.wind, SIM_DT);
            let Some(end) = path.last() else { continue };
            let miss = end.distance(target);
            if miss < best.0 {
                best = (miss, aim);
            }
        }
    }
    log::debug!("Bot aims at {:?} (predicted miss {:.1})", best.1, best.0);
    best.1
}

/// Host instance holding all state
struct Duel {
    state: MatchState,
    input: InputState,
    audio: AudioManager<LogSink>,
    bot: Bot,
    accumulator: f32,
    render_scale: f32,
}

impl Duel {
    fn new(terrain: TerrainGrid, settings: &Settings, seed: u64) -> Self {
        Self {
            state: MatchState::new(terrain, settings, seed),
            input: InputState::new(),
            audio: AudioManager::from_settings(LogSink, settings),
            bot: Bot::default(),
            accumulator: 0.0,
            render_scale: settings.render_scale,
        }
    }

    /// Run simulation ticks for one host frame
    fn update(&mut self, dt: f32) {
        self.bot.drive(&self.state, &mut self.input, self.render_scale);

        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.tick_input(&self.state.camera, self.render_scale);
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.end_tick();

            let events = self.state.drain_events();
            if events.iter().any(|e| matches!(e, MatchEvent::TurnStarted { .. })) {
                self.input.clear_held();
            }
            for event in &events {
                match event {
                    MatchEvent::PlayerHurt { player, amount } => {
                        log::info!("Player {player} hit for {amount:.1}");
                    }
                    MatchEvent::TurnTimedOut { player } => log::info!("Player {player} timed out"),
                    _ => {}
                }
            }
            self.audio.play_events(&events);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Worms Duel (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();

    if let [flag, out] = args.as_slice() {
        if flag == "--export-demo" {
            persistence::save_map(&demo_arena(), Path::new(out))
                .with_context(|| format!("writing demo map to {out}"))?;
            println!("Demo map written to {out}");
            return Ok(());
        }
    }

    let settings = Settings::load(Path::new(SETTINGS_FILE));
    let terrain = match args.first() {
        Some(path) => persistence::load_map(Path::new(path)).with_context(|| format!("loading map {path}"))?,
        None => {
            log::info!("No map given, using the demo arena");
            demo_arena()
        }
    };
    let seed = match args.get(1) {
        Some(seed) => seed.parse().with_context(|| format!("invalid seed {seed:?}"))?,
        None => DEFAULT_SEED,
    };

    let mut duel = Duel::new(terrain, &settings, seed);
    let mut frames = 0;
    while frames < MAX_FRAMES && duel.state.winner().is_none() {
        duel.update(FRAME_DT);
        frames += 1;
    }

    let seconds = frames as f32 * FRAME_DT;
    match duel.state.winner() {
        Some(winner) => println!(
            "Player {winner} wins after {} turns ({seconds:.0} s), health {:.0} / {:.0}",
            duel.bot.turns + 1,
            duel.state.players[0].health,
            duel.state.players[1].health
        ),
        None => println!(
            "No winner after {seconds:.0} s, health {:.0} / {:.0}",
            duel.state.players[0].health,
            duel.state.players[1].health
        ),
    }
    Ok(())
}
