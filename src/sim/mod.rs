//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod ballistics;
pub mod collision;
pub mod player;
pub mod projectile;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod timer;

pub use ballistics::{Blast, ImpactBehavior, Trajectory, Weapon, WeaponSpec, launch_vector, simulate};
pub use collision::{Collisions, falloff_damage, move_and_collide, probe_terrain};
pub use player::{Action, Player};
pub use projectile::{Projectile, StepMode, StepOutcome, predict_path};
pub use state::{Camera, MatchEvent, MatchPhase, MatchState, Particle};
pub use terrain::{ExtractedTile, OffgridTile, Rect, TerrainGrid, Tile, TileKind};
pub use tick::{TickInput, tick};
pub use timer::Countdown;
