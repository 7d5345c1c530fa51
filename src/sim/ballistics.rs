//! Closed-form ballistic trajectories
//!
//! Positions are evaluated analytically from the time since launch (or since
//! the last bounce) instead of being integrated, so an aiming preview and the
//! live shot trace exactly the same curve.
//!
//! ```text
//! x(t) = sx + vx·t + wind.x·t²
//! y(t) = sy + vy·t + ½·g·mass·t² + wind.y·t²
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;
use crate::wrap_angle;

/// What a projectile does when it touches solid terrain
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactBehavior {
    /// Explode on first contact
    Detonate,
    /// Reflect, keeping `restitution` of the launch force
    Bounce { restitution: f32 },
}

/// Crater and damage parameters of a detonation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blast {
    /// Terrain removal radius (cells)
    pub crater_radius: f32,
    /// Damage falloff radius (cells)
    pub damage_radius: f32,
    /// Damage at the epicenter
    pub damage: f32,
}

/// Physical constants of a weapon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub mass: f32,
    pub max_force: f32,
    pub blast: Blast,
    pub impact: ImpactBehavior,
    /// Seconds until detonation regardless of contact
    pub fuse: Option<f32>,
    pub wind_affected: bool,
    /// How far ahead the aiming preview looks (seconds)
    pub preview_horizon: f32,
    /// Cosmetic debris spawned on detonation
    pub particles: usize,
}

/// Selectable weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weapon {
    #[default]
    Rocket,
    Grenade,
}

impl Weapon {
    pub const ALL: [Weapon; 2] = [Weapon::Rocket, Weapon::Grenade];

    pub fn spec(self) -> WeaponSpec {
        match self {
            Weapon::Rocket => WeaponSpec {
                mass: 10.0,
                max_force: 300.0,
                blast: Blast {
                    crater_radius: 2.0,
                    damage_radius: 3.0,
                    damage: 30.0,
                },
                impact: ImpactBehavior::Detonate,
                fuse: None,
                wind_affected: true,
                preview_horizon: 10.0,
                particles: 50,
            },
            Weapon::Grenade => WeaponSpec {
                mass: 20.0,
                max_force: 200.0,
                blast: Blast {
                    crater_radius: 1.0,
                    damage_radius: 2.0,
                    damage: 20.0,
                },
                impact: ImpactBehavior::Bounce { restitution: 0.7 },
                fuse: Some(5.0),
                wind_affected: false,
                preview_horizon: 5.0,
                particles: 30,
            },
        }
    }

    /// Step through the weapon list, wrapping in both directions
    pub fn cycle(self, steps: i32) -> Self {
        let len = Self::ALL.len() as i32;
        let index = Self::ALL.iter().position(|w| *w == self).unwrap_or(0) as i32;
        Self::ALL[(index + steps).rem_euclid(len) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weapon::Rocket => "rocket",
            Weapon::Grenade => "grenade",
        }
    }
}

/// Launch angle and force for a shot from `origin` toward `aim`.
///
/// The angle is measured with screen y inverted and wrapped to [0, 2π); the
/// force is the aim distance capped at `max_force`. A zero-length aim gives
/// angle 0 and force 0.
pub fn launch_vector(origin: Vec2, aim: Vec2, max_force: f32) -> (f32, f32) {
    let v = aim - origin;
    let angle = wrap_angle((-v.y).atan2(v.x));
    let force = v.length().min(max_force);
    (angle, force)
}

/// One closed-form flight segment (launch or post-bounce)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub start: Vec2,
    pub angle: f32,
    pub force: f32,
    pub mass: f32,
    pub wind: Vec2,
}

impl Trajectory {
    /// Trajectory of `weapon` fired from `origin` toward `aim`
    pub fn launch(origin: Vec2, aim: Vec2, weapon: Weapon, wind: Vec2) -> Self {
        let spec = weapon.spec();
        let (angle, force) = launch_vector(origin, aim, spec.max_force);
        Self {
            start: origin,
            angle,
            force,
            mass: spec.mass,
            wind: if spec.wind_affected { wind } else { Vec2::ZERO },
        }
    }

    /// Launch velocity components (screen space)
    #[inline]
    pub fn launch_velocity(&self) -> Vec2 {
        Vec2::new(
            self.force * self.angle.cos(),
            -self.force * self.angle.sin(),
        )
    }

    /// Position `t` seconds into this segment
    pub fn position_at(&self, t: f32) -> Vec2 {
        let v = self.launch_velocity();
        let t2 = t * t;
        Vec2::new(
            self.start.x + v.x * t + self.wind.x * t2,
            self.start.y + v.y * t + 0.5 * GRAVITY * self.mass * t2 + self.wind.y * t2,
        )
    }

    /// Time derivative of [`Self::position_at`]
    pub fn velocity_at(&self, t: f32) -> Vec2 {
        let v = self.launch_velocity();
        Vec2::new(
            v.x + 2.0 * self.wind.x * t,
            v.y + GRAVITY * self.mass * t + 2.0 * self.wind.y * t,
        )
    }

    /// Lazy positions at `tick`, `2·tick`, ... (unbounded)
    pub fn samples(self, tick: f32) -> impl Iterator<Item = Vec2> {
        (1u32..).map(move |i| self.position_at(i as f32 * tick))
    }
}

/// Lazily sample the flight of `weapon` from `origin` toward `aim`
pub fn simulate(
    origin: Vec2,
    aim: Vec2,
    weapon: Weapon,
    wind: Vec2,
    tick: f32,
) -> impl Iterator<Item = Vec2> {
    Trajectory::launch(origin, aim, weapon, wind).samples(tick)
}
