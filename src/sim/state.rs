//! Match state and its transitions
//!
//! `MatchState` owns everything a duel needs: terrain, both players, the
//! projectile slot, turn clock, camera and cosmetic effects. The projectile
//! and phase are only changed through the methods here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ballistics::{Blast, Weapon};
use super::collision::falloff_damage;
use super::player::Player;
use super::projectile::{Projectile, StepMode, StepOutcome, predict_path};
use super::terrain::{TerrainGrid, TileKind};
use super::timer::Countdown;
use crate::Settings;
use crate::consts::*;

/// Spawner tiles: variant 0 for the first player, 1 for the second
pub const SPAWNER_PAIRS: [(TileKind, u8); 2] = [(TileKind::Spawners, 0), (TileKind::Spawners, 1)];

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Active player may move, jump, aim and shoot
    Playing,
    /// A projectile is in flight
    Airborne,
    /// Pause after a shot or timeout before the other player's turn
    TransitionDelay,
    /// Match over (terminal until restart)
    Victory { winner: usize },
}

/// Things that happened during a tick, for audio and HUD
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    TurnStarted { player: usize },
    TurnTimedOut { player: usize },
    Jumped { player: usize },
    Footstep { player: usize },
    ChargeCancelled { player: usize },
    Fired { player: usize, weapon: Weapon },
    Bounced { pos: Vec2 },
    Exploded { pos: Vec2, crater_radius: f32, cells_removed: usize },
    ProjectileLost,
    PlayerHurt { player: usize, amount: f32 },
    PlayerFell { player: usize },
    Victory { winner: usize },
}

/// Follow camera with screen shake
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Top-left of the view in world space
    pub scroll: Vec2,
    pub viewport: Vec2,
    pub smoothing: f32,
    pub shake: f32,
}

impl Camera {
    pub fn new(viewport: Vec2, smoothing: f32) -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport,
            smoothing: smoothing.max(1.0),
            shake: 0.0,
        }
    }

    /// Center on `target` immediately
    pub fn snap_to(&mut self, target: Vec2) {
        self.scroll = target - self.viewport / 2.0;
    }

    /// Ease toward centering `target`
    pub fn follow(&mut self, target: Vec2) {
        self.scroll += (target - self.viewport / 2.0 - self.scroll) / self.smoothing;
    }

    pub fn add_shake(&mut self, amount: f32) {
        self.shake = self.shake.max(amount);
    }

    pub fn decay_shake(&mut self) {
        self.shake *= 0.9;
        if self.shake < 0.01 {
            self.shake = 0.0;
        }
    }

    /// Scroll to render with, jittered by shake. `jitter` components are in [0, 1).
    pub fn render_scroll(&self, jitter: Vec2) -> Vec2 {
        (self.scroll + jitter * self.shake - Vec2::splat(self.shake / 2.0)).floor()
    }

    /// World position under a window pixel
    pub fn screen_to_world(&self, screen: Vec2, render_scale: f32) -> Vec2 {
        screen / render_scale.max(f32::EPSILON) + self.scroll
    }
}

/// Explosion debris (cosmetic)
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    /// Seconds left
    pub life: f32,
    pub size: f32,
}

/// Complete match state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub terrain: TerrainGrid,
    /// Terrain right after spawner extraction, for restarts
    pristine: TerrainGrid,
    spawns: [Vec2; 2],
    pub players: [Player; 2],
    /// Index of the player whose turn it is
    pub active: usize,
    phase: MatchPhase,
    pub countdown: Countdown,
    transition_elapsed: f32,
    transition_delay: f32,
    pub wind: Vec2,
    max_wind: f32,
    projectile: Option<Projectile>,
    preview: Vec<Vec2>,
    pub particles: Vec<Particle>,
    pub camera: Camera,
    screen_shake: bool,
    /// Below this y things are gone for good
    kill_plane: f32,
    events: Vec<MatchEvent>,
    rng: Pcg32,
}

impl MatchState {
    /// Start a match on `terrain`. Spawner tiles are pulled out of the map
    /// and become the players' starting positions.
    pub fn new(mut terrain: TerrainGrid, settings: &Settings, seed: u64) -> Self {
        let spawns = take_spawns(&mut terrain);
        let ts = terrain.tile_size() as f32;
        let kill_plane = (terrain.lowest_row().unwrap_or(0) + KILL_PLANE_MARGIN_CELLS) as f32 * ts;

        let mut state = Self {
            seed,
            time_ticks: 0,
            pristine: terrain.clone(),
            terrain,
            spawns,
            players: spawns.map(|pos| Player::new(pos, settings.max_jumps)),
            active: 0,
            phase: MatchPhase::Playing,
            countdown: Countdown::new(settings.turn_seconds),
            transition_elapsed: 0.0,
            transition_delay: settings.transition_delay.max(0.0),
            wind: Vec2::ZERO,
            max_wind: settings.max_wind.max(0.0),
            projectile: None,
            preview: Vec::new(),
            particles: Vec::new(),
            camera: Camera::new(settings.viewport, settings.camera_smoothing),
            screen_shake: settings.screen_shake,
            kill_plane,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.roll_wind();
        state.camera.snap_to(state.players[0].center());
        state.events.push(MatchEvent::TurnStarted { player: 0 });

        log::info!(
            "Match started: {} tiles, spawns {:?} / {:?}, wind {:?}",
            state.terrain.len(),
            spawns[0],
            spawns[1],
            state.wind
        );
        state
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    /// Predicted path of the active player's aimed shot (empty when not aiming)
    pub fn preview(&self) -> &[Vec2] {
        &self.preview
    }

    pub fn kill_plane(&self) -> f32 {
        self.kill_plane
    }

    pub fn winner(&self) -> Option<usize> {
        match self.phase {
            MatchPhase::Victory { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.active]
    }

    pub fn active_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.active]
    }

    pub(crate) fn push_event(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    fn roll_wind(&mut self) {
        self.wind = if self.max_wind > 0.0 {
            Vec2::new(
                self.rng.random_range(-self.max_wind..=self.max_wind),
                self.rng.random_range(-self.max_wind..=self.max_wind) * 0.25,
            )
        } else {
            Vec2::ZERO
        };
    }

    /// Recompute the aiming preview toward `aim`
    pub fn refresh_preview(&mut self, aim: Vec2) {
        let player = &self.players[self.active];
        self.preview = predict_path(&self.terrain, player.center(), aim, player.weapon, self.wind, SIM_DT);
    }

    pub fn clear_preview(&mut self) {
        self.preview.clear();
    }

    /// Launch the active player's weapon from `origin` toward `aim`.
    ///
    /// Only allowed while `Playing` with an empty projectile slot.
    pub fn fire_projectile(&mut self, origin: Vec2, aim: Vec2) -> bool {
        if self.phase != MatchPhase::Playing || self.projectile.is_some() {
            return false;
        }

        let player = &mut self.players[self.active];
        player.aiming = false;
        let weapon = player.weapon;
        let projectile = Projectile::fire(origin, aim, weapon, self.wind);
        log::debug!(
            "Player {} fired {} (angle {:.3}, force {:.1})",
            self.active,
            weapon.as_str(),
            projectile.angle(),
            projectile.force()
        );

        self.projectile = Some(projectile);
        self.preview.clear();
        self.phase = MatchPhase::Airborne;
        self.events.push(MatchEvent::Fired {
            player: self.active,
            weapon,
        });
        true
    }

    /// Advance the projectile in flight by `dt` seconds
    pub fn step_projectile(&mut self, dt: f32) {
        let Some(projectile) = self.projectile.as_mut() else {
            return;
        };
        let outcome = projectile.step(&self.terrain, dt, StepMode::Live);
        let pos = projectile.pos();
        let weapon = projectile.weapon();

        match outcome {
            StepOutcome::Detonated(at) => {
                self.projectile = None;
                self.detonate(at, weapon);
            }
            StepOutcome::Bounced => {
                log::debug!("{} bounced at {pos:?}", weapon.as_str());
                self.events.push(MatchEvent::Bounced { pos });
            }
            StepOutcome::Flying | StepOutcome::Halted(_) => {}
        }

        if self.projectile.is_some() && pos.y > self.kill_plane {
            log::debug!("{} fell out of the world", weapon.as_str());
            self.projectile = None;
            self.events.push(MatchEvent::ProjectileLost);
            self.begin_transition();
        }
    }

    /// Explode `weapon` at `pos`: crater, damage, debris, shake, then hand
    /// over the turn unless somebody died.
    pub fn detonate(&mut self, pos: Vec2, weapon: Weapon) {
        let spec = weapon.spec();
        self.apply_blast(pos, spec.blast);
        self.spawn_particles(pos, spec.particles);
        if self.screen_shake {
            self.camera.add_shake(EXPLOSION_SHAKE);
        }
        if self.winner().is_none() {
            self.begin_transition();
        }
    }

    /// Carve a crater at `epicenter` and damage players in range.
    ///
    /// Damage falls off linearly to zero at `damage_radius` cells, measured
    /// to each player's position.
    pub fn apply_blast(&mut self, epicenter: Vec2, blast: Blast) {
        let cells_removed = self.terrain.remove_disk(epicenter, blast.crater_radius);
        log::debug!(
            "Explosion at {epicenter:?}: crater radius {}, {cells_removed} cells removed",
            blast.crater_radius
        );
        self.events.push(MatchEvent::Exploded {
            pos: epicenter,
            crater_radius: blast.crater_radius,
            cells_removed,
        });

        let radius = blast.damage_radius * self.terrain.tile_size() as f32;
        for (index, player) in self.players.iter_mut().enumerate() {
            let amount = falloff_damage(player.pos.distance(epicenter), radius, blast.damage);
            if amount <= 0.0 {
                continue;
            }
            let lost = player.take_damage(amount);
            if lost > 0.0 {
                log::debug!("Player {index} took {lost:.1} damage ({:.1} left)", player.health);
                self.events.push(MatchEvent::PlayerHurt {
                    player: index,
                    amount: lost,
                });
            }
        }

        self.check_victory();
    }

    /// End the match if a player is dead. Players are checked in index
    /// order, so a double knockout goes to the second player.
    pub fn check_victory(&mut self) -> bool {
        if let MatchPhase::Victory { .. } = self.phase {
            return true;
        }
        let Some(loser) = self.players.iter().position(|p| !p.is_alive()) else {
            return false;
        };

        let winner = 1 - loser;
        log::info!("Player {winner} wins");
        self.phase = MatchPhase::Victory { winner };
        self.projectile = None;
        self.preview.clear();
        for player in &mut self.players {
            player.cancel_charges();
        }
        self.events.push(MatchEvent::Victory { winner });
        true
    }

    /// Clock ran out on the active player
    pub fn time_out(&mut self) {
        log::info!("Player {} ran out of time", self.active);
        self.events.push(MatchEvent::TurnTimedOut { player: self.active });
        self.begin_transition();
    }

    /// Enter the pause before the next turn
    pub fn begin_transition(&mut self) {
        if let MatchPhase::Victory { .. } = self.phase {
            return;
        }
        self.phase = MatchPhase::TransitionDelay;
        self.transition_elapsed = 0.0;
        self.projectile = None;
        self.preview.clear();
        self.players[self.active].cancel_charges();
    }

    /// Count down the transition pause; true once it has elapsed
    pub fn advance_transition(&mut self, dt: f32) -> bool {
        self.transition_elapsed += dt;
        self.transition_elapsed >= self.transition_delay - 1e-6
    }

    /// Hand the turn to the other player
    pub fn finish_transition(&mut self) {
        if self.phase != MatchPhase::TransitionDelay {
            return;
        }
        self.active = 1 - self.active;
        self.countdown.reset();
        for player in &mut self.players {
            player.cancel_charges();
            player.velocity.x = 0.0;
        }
        self.phase = MatchPhase::Playing;
        log::info!("Player {}'s turn", self.active);
        self.events.push(MatchEvent::TurnStarted { player: self.active });
    }

    /// Fresh match on the same map: pristine terrain, spawn positions, new wind
    pub fn restart(&mut self) {
        self.terrain = self.pristine.clone();
        for (player, spawn) in self.players.iter_mut().zip(self.spawns) {
            player.respawn(spawn);
        }
        self.active = 0;
        self.phase = MatchPhase::Playing;
        self.countdown.reset();
        self.transition_elapsed = 0.0;
        self.projectile = None;
        self.preview.clear();
        self.particles.clear();
        self.camera.shake = 0.0;
        self.roll_wind();
        self.camera.snap_to(self.players[0].center());
        log::info!("Match restarted, wind {:?}", self.wind);
        self.events.push(MatchEvent::TurnStarted { player: 0 });
    }

    /// Player physics for one step; only the active player steers, and only
    /// while `Playing`.
    pub fn update_players(&mut self, movement_x: f32, dt_scale: f32) {
        let steering = self.phase == MatchPhase::Playing;
        for index in 0..self.players.len() {
            let movement = if steering && index == self.active { movement_x } else { 0.0 };
            let player = &mut self.players[index];
            if !player.is_alive() {
                continue;
            }
            if player.update(&self.terrain, movement, dt_scale) {
                self.events.push(MatchEvent::Footstep { player: index });
            }
            if player.pos.y > self.kill_plane {
                log::info!("Player {index} fell out of the world");
                player.kill();
                self.events.push(MatchEvent::PlayerFell { player: index });
            }
        }
        self.check_victory();
    }

    fn spawn_particles(&mut self, pos: Vec2, count: usize) {
        let room = MAX_PARTICLES.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let angle: f32 = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = self.rng.random_range(0.5..3.0);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: self.rng.random_range(0.4..1.2),
                size: self.rng.random_range(1.0..3.0),
            });
        }
    }

    pub fn update_particles(&mut self, dt: f32, dt_scale: f32) {
        for particle in &mut self.particles {
            particle.pos += particle.vel * dt_scale;
            particle.vel.y += FALL_ACCELERATION * dt_scale;
            particle.life -= dt;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Ease the camera toward the projectile or active player. Held still
    /// during the transition pause so the crater stays in view.
    pub fn update_camera(&mut self) {
        self.camera.decay_shake();
        if self.phase == MatchPhase::TransitionDelay {
            return;
        }
        let target = match &self.projectile {
            Some(projectile) => projectile.pos(),
            None => self.players[self.active].center(),
        };
        self.camera.follow(target);
    }
}

/// Pull spawner tiles out of `terrain` and return the two starting positions
fn take_spawns(terrain: &mut TerrainGrid) -> [Vec2; 2] {
    let extracted = terrain.extract_and_remove(&SPAWNER_PAIRS);
    let find = |variant: u8| extracted.iter().find(|t| t.variant == variant).map(|t| t.pos);

    let first = find(0).unwrap_or_else(|| {
        log::warn!("Map has no spawner for player 0, using the origin");
        Vec2::ZERO
    });
    let second = find(1).unwrap_or_else(|| {
        log::warn!("Map has no spawner for player 1, placing them beside player 0");
        first + Vec2::new(terrain.tile_size() as f32 * 8.0, 0.0)
    });
    [first, second]
}
