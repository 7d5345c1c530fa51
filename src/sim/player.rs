//! Player entity: AABB physics, jumping, health
//!
//! Movement tuning is expressed per 60 Hz frame; `dt_scale` (elapsed time
//! times `TARGET_FPS`) converts it to the actual step.

use glam::Vec2;

use super::ballistics::Weapon;
use super::collision::{Collisions, move_and_collide};
use super::terrain::{Rect, TerrainGrid};
use crate::consts::*;

/// Animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Idle,
    Run,
    Jump,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Run => "run",
            Action::Jump => "jump",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left corner of the bounding box
    pub pos: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub collisions: Collisions,
    pub health: f32,
    pub jumps: u32,
    pub max_jumps: u32,
    /// Frames since last standing on something
    pub air_time: u32,
    pub action: Action,
    /// Facing left
    pub flip: bool,
    pub weapon: Weapon,
    /// Upward impulse that will be applied on release
    pub jump_charge: Option<f32>,
    /// Shot charge held (preview visible)
    pub aiming: bool,
    footstep_frames: u32,
}

impl Player {
    pub fn new(pos: Vec2, max_jumps: u32) -> Self {
        Self {
            pos,
            velocity: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            collisions: Collisions::default(),
            health: MAX_HEALTH,
            jumps: max_jumps,
            max_jumps,
            air_time: 0,
            action: Action::Idle,
            flip: false,
            weapon: Weapon::default(),
            jump_charge: None,
            aiming: false,
            footstep_frames: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Where shots leave from
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract health, clamped at zero; returns the amount actually lost
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).max(0.0);
        before - self.health
    }

    pub fn kill(&mut self) {
        self.health = 0.0;
    }

    pub fn begin_jump_charge(&mut self) {
        self.jump_charge = Some(JUMP_CHARGE_MIN);
    }

    /// Grow a held jump charge
    pub fn charge_jump(&mut self, dt_scale: f32) {
        if let Some(charge) = self.jump_charge.as_mut() {
            *charge = (*charge + JUMP_CHARGE_RATE * dt_scale).min(JUMP_CHARGE_MAX);
        }
    }

    /// Release a held jump charge.
    ///
    /// The first jump is only available shortly after leaving the ground;
    /// any remaining extra jumps work in the air. Returns whether a jump
    /// happened.
    pub fn release_jump(&mut self) -> bool {
        let Some(charge) = self.jump_charge.take() else {
            return false;
        };
        let grounded = self.air_time < COYOTE_FRAMES;
        if self.jumps == 0 || (!grounded && self.jumps == self.max_jumps) {
            return false;
        }

        self.velocity.y = -charge;
        self.jumps -= 1;
        self.air_time = COYOTE_FRAMES;
        true
    }

    /// Drop any charge in progress
    pub fn cancel_charges(&mut self) {
        self.jump_charge = None;
        self.aiming = false;
    }

    pub fn cycle_weapon(&mut self, steps: i32) {
        self.weapon = self.weapon.cycle(steps);
    }

    /// Put the player back at a spawn with full health
    pub fn respawn(&mut self, pos: Vec2) {
        *self = Self {
            weapon: self.weapon,
            ..Self::new(pos, self.max_jumps)
        };
    }

    /// Advance physics by one step.
    ///
    /// `movement_x` is the held direction (-1, 0 or 1). Returns true when a
    /// footstep should sound.
    pub fn update(&mut self, terrain: &TerrainGrid, movement_x: f32, dt_scale: f32) -> bool {
        let frame_movement = Vec2::new(
            (movement_x + self.velocity.x) * 0.5 * dt_scale,
            self.velocity.y * dt_scale,
        );
        self.collisions = move_and_collide(terrain, &mut self.pos, self.size, frame_movement);

        self.velocity.y = (self.velocity.y + FALL_ACCELERATION * dt_scale).min(MAX_FALL_SPEED);
        if self.collisions.vertical() {
            self.velocity.y = 0.0;
        }

        let friction = GROUND_FRICTION * dt_scale;
        self.velocity.x = if self.velocity.x > 0.0 {
            (self.velocity.x - friction).max(0.0)
        } else {
            (self.velocity.x + friction).min(0.0)
        };

        self.air_time = self.air_time.saturating_add(1);
        if self.collisions.bottom {
            self.air_time = 0;
            self.jumps = self.max_jumps;
        }

        if movement_x < 0.0 {
            self.flip = true;
        } else if movement_x > 0.0 {
            self.flip = false;
        }

        self.action = if self.air_time > AIRBORNE_FRAMES {
            Action::Jump
        } else if movement_x != 0.0 {
            Action::Run
        } else {
            Action::Idle
        };

        if self.action == Action::Run {
            self.footstep_frames += 1;
            if self.footstep_frames >= FOOTSTEP_INTERVAL {
                self.footstep_frames = 0;
                return true;
            }
        } else {
            self.footstep_frames = 0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TileKind;
    use glam::IVec2;

    fn flat(tile_size: u32) -> TerrainGrid {
        let mut grid = TerrainGrid::new(tile_size);
        for x in -10..10 {
            grid.set_tile(IVec2::new(x, 4), TileKind::Grass, 0);
        }
        grid
    }

    fn settle(player: &mut Player, grid: &TerrainGrid) {
        for _ in 0..120 {
            player.update(grid, 0.0, 1.0);
        }
    }

    #[test]
    fn test_falls_and_lands() {
        let grid = flat(16);
        let mut player = Player::new(Vec2::new(0.0, 0.0), 2);
        settle(&mut player, &grid);
        assert_eq!(player.pos.y, 64.0 - PLAYER_HEIGHT);
        assert!(player.air_time < COYOTE_FRAMES);
        assert_eq!(player.action, Action::Idle);
    }

    #[test]
    fn test_fall_speed_is_capped() {
        let grid = TerrainGrid::new(16);
        let mut player = Player::new(Vec2::ZERO, 1);
        for _ in 0..200 {
            player.update(&grid, 0.0, 1.0);
        }
        assert_eq!(player.velocity.y, MAX_FALL_SPEED);
        assert_eq!(player.action, Action::Jump);
    }

    #[test]
    fn test_jump_charge_grows_and_caps() {
        let mut player = Player::new(Vec2::ZERO, 1);
        player.begin_jump_charge();
        player.charge_jump(1.0);
        assert!((player.jump_charge.unwrap() - (JUMP_CHARGE_MIN + JUMP_CHARGE_RATE)).abs() < 1e-6);
        for _ in 0..200 {
            player.charge_jump(1.0);
        }
        assert_eq!(player.jump_charge, Some(JUMP_CHARGE_MAX));
    }

    #[test]
    fn test_release_applies_impulse_and_consumes_jump() {
        let grid = flat(16);
        let mut player = Player::new(Vec2::ZERO, 1);
        settle(&mut player, &grid);

        player.begin_jump_charge();
        for _ in 0..10 {
            player.charge_jump(1.0);
        }
        assert!(player.release_jump());
        assert!((player.velocity.y + 2.0).abs() < 1e-5);
        assert_eq!(player.jumps, 0);
        assert_eq!(player.jump_charge, None);

        // No jumps left in the air
        player.update(&grid, 0.0, 1.0);
        player.begin_jump_charge();
        assert!(!player.release_jump());
    }

    #[test]
    fn test_double_jump_in_air() {
        let grid = flat(16);
        let mut player = Player::new(Vec2::ZERO, 2);
        settle(&mut player, &grid);
        player.begin_jump_charge();
        assert!(player.release_jump());
        for _ in 0..5 {
            player.update(&grid, 0.0, 1.0);
        }
        player.begin_jump_charge();
        assert!(player.release_jump());
        assert_eq!(player.jumps, 0);
    }

    #[test]
    fn test_landing_refills_jumps() {
        let grid = flat(16);
        let mut player = Player::new(Vec2::ZERO, 1);
        settle(&mut player, &grid);

        player.begin_jump_charge();
        assert!(player.release_jump());
        assert_eq!(player.jumps, 0);

        for _ in 0..200 {
            player.update(&grid, 0.0, 1.0);
            if player.collisions.bottom {
                break;
            }
        }
        assert!(player.collisions.bottom);
        assert_eq!(player.jumps, player.max_jumps);
        assert_eq!(player.air_time, 0);

        player.begin_jump_charge();
        assert!(player.release_jump());
    }

    #[test]
    fn test_walked_off_ledge_loses_first_jump() {
        let grid = TerrainGrid::new(16);
        let mut player = Player::new(Vec2::ZERO, 1);
        for _ in 0..COYOTE_FRAMES + 2 {
            player.update(&grid, 0.0, 1.0);
        }
        player.begin_jump_charge();
        assert!(!player.release_jump());
    }

    #[test]
    fn test_cancel_leaves_no_residue() {
        let mut player = Player::new(Vec2::ZERO, 1);
        player.begin_jump_charge();
        player.aiming = true;
        player.cancel_charges();
        assert_eq!(player.jump_charge, None);
        assert!(!player.aiming);
        assert!(!player.release_jump());
        assert_eq!(player.jumps, 1);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut player = Player::new(Vec2::ZERO, 1);
        assert_eq!(player.take_damage(30.0), 30.0);
        assert_eq!(player.health, 70.0);
        assert_eq!(player.take_damage(500.0), 70.0);
        assert_eq!(player.health, 0.0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_running_flips_and_steps() {
        let grid = flat(16);
        let mut player = Player::new(Vec2::ZERO, 1);
        settle(&mut player, &grid);
        let start_x = player.pos.x;

        let steps = (0..FOOTSTEP_INTERVAL * 2)
            .filter(|_| player.update(&grid, -1.0, 1.0))
            .count();
        assert_eq!(steps, 2);
        assert!(player.flip);
        assert_eq!(player.action, Action::Run);
        assert!(player.pos.x < start_x);
    }

    #[test]
    fn test_horizontal_velocity_decays() {
        let grid = flat(16);
        let mut player = Player::new(Vec2::ZERO, 1);
        settle(&mut player, &grid);
        player.velocity.x = 0.35;
        for _ in 0..3 {
            player.update(&grid, 0.0, 1.0);
        }
        assert!(player.velocity.x.abs() < 0.06);
        for _ in 0..2 {
            player.update(&grid, 0.0, 1.0);
        }
        assert_eq!(player.velocity.x, 0.0);
    }
}
