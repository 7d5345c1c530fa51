//! Worms Duel - A turn-based artillery duel on destructible tile terrain
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, ballistics, players, turns)
//! - `persistence`: Terrain map save/load
//! - `platform`: Input mapping and asset sizing collaborators
//! - `audio`: Sound cue dispatch
//! - `settings`: Data-driven match configuration

pub mod audio;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the frame rate the movement tuning assumes)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Frame rate that player movement constants are expressed in
    pub const TARGET_FPS: f32 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default pixels per terrain cell
    pub const DEFAULT_TILE_SIZE: u32 = 16;

    /// Gravitational acceleration fed into the closed-form trajectory
    pub const GRAVITY: f32 = 9.8;
    /// Distance of collision probes from a projectile's center (pixels)
    pub const PROBE_OFFSET: f32 = 2.0;
    /// Upward nudge applied to a grenade after a floor bounce
    pub const FLOOR_NUDGE: f32 = 1.0;
    /// Preview points are recorded at this interval (seconds)
    pub const PREVIEW_SAMPLE_INTERVAL: f32 = 0.2;

    /// Player bounding box
    pub const PLAYER_WIDTH: f32 = 8.0;
    pub const PLAYER_HEIGHT: f32 = 15.0;
    pub const MAX_HEALTH: f32 = 100.0;
    /// Terminal fall speed (units per frame)
    pub const MAX_FALL_SPEED: f32 = 3.0;
    /// Gravity added to vertical velocity each frame
    pub const FALL_ACCELERATION: f32 = 0.1;
    /// Horizontal velocity friction per frame
    pub const GROUND_FRICTION: f32 = 0.1;
    /// Frames after leaving the ground during which the first jump is still allowed
    pub const COYOTE_FRAMES: u32 = 8;
    /// Air time above which the jump animation plays
    pub const AIRBORNE_FRAMES: u32 = 4;

    /// Jump charge (upward impulse) bounds and growth per frame
    pub const JUMP_CHARGE_MIN: f32 = 1.5;
    pub const JUMP_CHARGE_MAX: f32 = 4.0;
    pub const JUMP_CHARGE_RATE: f32 = 0.05;
    /// Frames between footstep cues while running
    pub const FOOTSTEP_INTERVAL: u32 = 18;

    /// Camera shake added by a detonation
    pub const EXPLOSION_SHAKE: f32 = 16.0;
    /// Maximum live particles
    pub const MAX_PARTICLES: usize = 256;
    /// Cells below the lowest terrain row where things are considered lost
    pub const KILL_PLANE_MARGIN_CELLS: i32 = 20;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Screen-space heading of a motion vector in degrees, [0, 360).
///
/// Screen y grows downward, so the vertical component is inverted before
/// taking the angle.
#[inline]
pub fn heading_degrees(delta: Vec2) -> f32 {
    wrap_angle((-delta.y).atan2(delta.x)).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        assert!(wrap_angle(-1e-9) < TAU);
    }

    #[test]
    fn test_heading_degrees() {
        assert!((heading_degrees(Vec2::new(1.0, 0.0))).abs() < 1e-4);
        // Moving up the screen
        assert!((heading_degrees(Vec2::new(0.0, -1.0)) - 90.0).abs() < 1e-4);
        // Moving down the screen
        assert!((heading_degrees(Vec2::new(0.0, 1.0)) - 270.0).abs() < 1e-4);
    }
}
