//! Live projectile stepping
//!
//! A projectile re-derives its own closed-form segment on every bounce. The
//! same [`Projectile::step`] drives both the live shot and the aiming preview
//! so the two can never drift apart; the preview only differs in how it
//! treats terrain contact.

use glam::Vec2;

use super::ballistics::{ImpactBehavior, Trajectory, Weapon};
use super::collision::{Collisions, probe_terrain};
use super::terrain::TerrainGrid;
use crate::consts::{FLOOR_NUDGE, PREVIEW_SAMPLE_INTERVAL, PROBE_OFFSET};
use crate::{heading_degrees, wrap_angle};

/// How a step treats terrain contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Bounce or detonate, burn the fuse
    Live,
    /// Stop at the first contact, leave the fuse alone
    Preview,
}

/// Result of one projectile step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Flying,
    Bounced,
    /// Live run ended; detonate at this point
    Detonated(Vec2),
    /// Preview run touched terrain here
    Halted(Vec2),
}

/// A player-fired projectile in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    weapon: Weapon,
    flight: Trajectory,
    /// Seconds since launch or last bounce
    time: f32,
    pos: Vec2,
    prev_pos: Vec2,
    fuse: Option<f32>,
    /// Sprite rotation in degrees, from the last step's heading
    rotation: f32,
    bounces: u32,
}

impl Projectile {
    pub fn fire(origin: Vec2, aim: Vec2, weapon: Weapon, wind: Vec2) -> Self {
        let flight = Trajectory::launch(origin, aim, weapon, wind);
        Self {
            weapon,
            flight,
            time: 0.0,
            pos: origin,
            prev_pos: origin,
            fuse: weapon.spec().fuse,
            rotation: heading_degrees(flight.launch_velocity()),
            bounces: 0,
        }
    }

    pub fn weapon(&self) -> Weapon {
        self.weapon
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn prev_pos(&self) -> Vec2 {
        self.prev_pos
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn force(&self) -> f32 {
        self.flight.force
    }

    pub fn angle(&self) -> f32 {
        self.flight.angle
    }

    pub fn fuse(&self) -> Option<f32> {
        self.fuse
    }

    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    pub fn flight(&self) -> &Trajectory {
        &self.flight
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, terrain: &TerrainGrid, dt: f32, mode: StepMode) -> StepOutcome {
        self.time += dt;
        self.prev_pos = self.pos;
        self.pos = self.flight.position_at(self.time);

        let motion = self.pos - self.prev_pos;
        if motion != Vec2::ZERO {
            self.rotation = heading_degrees(motion);
        }

        let impact = self.weapon.spec().impact;

        if mode == StepMode::Preview {
            let contact = match impact {
                ImpactBehavior::Detonate => terrain.segment_first_solid_hit(self.prev_pos, self.pos),
                ImpactBehavior::Bounce { .. } => terrain.is_solid(self.pos).then_some(self.pos),
            };
            return contact.map_or(StepOutcome::Flying, StepOutcome::Halted);
        }

        let mut outcome = StepOutcome::Flying;
        let hits = probe_terrain(terrain, self.pos, motion, PROBE_OFFSET);
        if hits.any() {
            match impact {
                ImpactBehavior::Detonate => return StepOutcome::Detonated(self.pos),
                ImpactBehavior::Bounce { restitution } => {
                    self.bounce(hits, restitution);
                    outcome = StepOutcome::Bounced;
                }
            }
        }

        if let Some(fuse) = self.fuse.as_mut() {
            *fuse -= dt;
            if *fuse <= 0.0 {
                return StepOutcome::Detonated(self.pos);
            }
        }

        outcome
    }

    /// Reflect off the sides that were hit and restart the flight clock
    fn bounce(&mut self, hits: Collisions, restitution: f32) {
        let mut vel = self.flight.velocity_at(self.time);

        if hits.left {
            self.pos.x += PROBE_OFFSET;
            vel.x = vel.x.abs();
        } else if hits.right {
            self.pos.x -= PROBE_OFFSET;
            vel.x = -vel.x.abs();
        }

        if hits.top {
            self.pos.y += PROBE_OFFSET;
            vel.y = vel.y.abs();
        } else if hits.bottom {
            // Lift off the floor so the next probe doesn't re-trigger in place
            self.pos.y -= FLOOR_NUDGE;
            vel.y = -vel.y.abs();
        }

        self.flight = Trajectory {
            start: self.pos,
            angle: wrap_angle((-vel.y).atan2(vel.x)),
            force: self.flight.force * restitution,
            ..self.flight
        };
        self.time = 0.0;
        self.bounces += 1;
    }
}

/// Predicted path of a shot for the aiming overlay.
///
/// Steps at `tick` with the live step function in preview mode, records a
/// point every [`PREVIEW_SAMPLE_INTERVAL`] seconds up to the weapon's
/// horizon, and ends with the terrain contact point if there is one.
pub fn predict_path(
    terrain: &TerrainGrid,
    origin: Vec2,
    aim: Vec2,
    weapon: Weapon,
    wind: Vec2,
    tick: f32,
) -> Vec<Vec2> {
    let horizon = weapon.spec().preview_horizon;
    let mut shot = Projectile::fire(origin, aim, weapon, wind);
    let mut path = Vec::new();
    if tick <= 0.0 {
        return path;
    }

    let mut elapsed = 0.0;
    let mut until_sample = PREVIEW_SAMPLE_INTERVAL;
    while elapsed < horizon {
        elapsed += tick;
        until_sample -= tick;

        if let StepOutcome::Halted(contact) = shot.step(terrain, tick, StepMode::Preview) {
            path.push(contact);
            break;
        }

        if until_sample <= 1e-6 {
            until_sample += PREVIEW_SAMPLE_INTERVAL;
            path.push(shot.pos());
        }
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::terrain::TileKind;
    use glam::IVec2;

    /// Flat floor whose top edge is at y = `row * tile_size`
    fn floor(tile_size: u32, row: i32) -> TerrainGrid {
        let mut grid = TerrainGrid::new(tile_size);
        for x in -20..60 {
            grid.set_tile(IVec2::new(x, row), TileKind::Grass, 0);
        }
        grid
    }

    #[test]
    fn test_rocket_detonates_on_floor() {
        let grid = floor(10, 5);
        let mut rocket = Projectile::fire(Vec2::ZERO, Vec2::new(100.0, 0.0), Weapon::Rocket, Vec2::ZERO);
        assert_eq!(rocket.angle(), 0.0);
        assert!((rocket.force() - 100.0).abs() < 1e-4);

        let mut ticks = 0;
        let impact = loop {
            ticks += 1;
            assert!(ticks < 600, "rocket never landed");
            match rocket.step(&grid, SIM_DT, StepMode::Live) {
                StepOutcome::Detonated(pos) => break pos,
                StepOutcome::Flying => {}
                other => panic!("unexpected {other:?}"),
            }
        };

        assert_eq!(ticks, 60);
        assert!((impact.x - 100.0).abs() < 0.1);
        assert!(impact.y > 48.0 && impact.y < 50.0);
        // Heading right and falling
        assert!(rocket.rotation() > 270.0 && rocket.rotation() < 360.0);
    }

    #[test]
    fn test_grenade_bounce_energy_loss() {
        let grid = floor(16, 4);
        let mut grenade = Projectile::fire(Vec2::ZERO, Vec2::new(60.0, 0.0), Weapon::Grenade, Vec2::ZERO);
        let mut forces = vec![grenade.force()];

        for _ in 0..600 {
            match grenade.step(&grid, SIM_DT, StepMode::Live) {
                StepOutcome::Bounced => forces.push(grenade.force()),
                StepOutcome::Detonated(_) => break,
                _ => {}
            }
        }

        assert!(forces.len() >= 4, "expected several bounces, got {forces:?}");
        for pair in forces.windows(2) {
            assert!(pair[1] < pair[0]);
            assert!((pair[1] - pair[0] * 0.7).abs() < 1e-3);
        }
        assert_eq!(grenade.bounces() as usize, forces.len() - 1);
    }

    #[test]
    fn test_grenade_floor_bounce_goes_up() {
        let grid = floor(16, 4);
        let mut grenade = Projectile::fire(Vec2::ZERO, Vec2::new(60.0, 0.0), Weapon::Grenade, Vec2::ZERO);
        loop {
            if grenade.step(&grid, SIM_DT, StepMode::Live) == StepOutcome::Bounced {
                break;
            }
        }
        // Launch angle now points up and to the right
        let angle = grenade.angle();
        assert!(angle > 0.0 && angle < std::f32::consts::FRAC_PI_2);
        assert!(grenade.pos().y < 64.0);
    }

    #[test]
    fn test_grenade_fuse_detonates_in_open_air() {
        let grid = TerrainGrid::new(16);
        let mut grenade = Projectile::fire(Vec2::ZERO, Vec2::new(0.0, -100.0), Weapon::Grenade, Vec2::ZERO);
        let mut ticks = 0;
        while !matches!(grenade.step(&grid, SIM_DT, StepMode::Live), StepOutcome::Detonated(_)) {
            ticks += 1;
            assert!(ticks < 1000);
        }
        // 5 s at 60 Hz
        assert!((298..=301).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn test_preview_matches_live_flight() {
        let grid = floor(10, 5);
        let origin = Vec2::new(-50.0, -20.0);
        let aim = Vec2::new(30.0, -90.0);
        let wind = Vec2::new(3.0, 0.0);

        let path = predict_path(&grid, origin, aim, Weapon::Rocket, wind, SIM_DT);
        assert!(path.len() > 2);

        let mut live = Projectile::fire(origin, aim, Weapon::Rocket, wind);
        for _ in 0..12 {
            live.step(&grid, SIM_DT, StepMode::Live);
        }
        assert_eq!(path[0], live.pos());

        // Truncated at the floor surface
        let last = *path.last().expect("non-empty path");
        assert!(grid.is_solid(last));
        assert!(path[..path.len() - 1].iter().all(|p| !grid.is_solid(*p)));
    }

    #[test]
    fn test_preview_leaves_fuse_and_stops_at_contact() {
        let grid = floor(16, 4);
        let mut grenade = Projectile::fire(Vec2::ZERO, Vec2::new(60.0, 0.0), Weapon::Grenade, Vec2::ZERO);
        let mut outcome = StepOutcome::Flying;
        for _ in 0..600 {
            outcome = grenade.step(&grid, SIM_DT, StepMode::Preview);
            if outcome != StepOutcome::Flying {
                break;
            }
        }
        assert!(matches!(outcome, StepOutcome::Halted(_)));
        assert_eq!(grenade.fuse(), Some(5.0));
        assert_eq!(grenade.bounces(), 0);
    }

    #[test]
    fn test_preview_respects_horizon() {
        let grid = TerrainGrid::new(16);
        let path = predict_path(&grid, Vec2::ZERO, Vec2::new(50.0, -50.0), Weapon::Grenade, Vec2::ZERO, SIM_DT);
        // 5 s horizon, a point every 0.2 s
        assert!((24..=25).contains(&path.len()), "len = {}", path.len());
    }
}
