//! Fixed timestep simulation tick
//!
//! Core game loop that advances a match deterministically.

use glam::Vec2;

use super::state::{MatchEvent, MatchPhase, MatchState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Held movement keys
    pub move_left: bool,
    pub move_right: bool,
    /// Jump key went down / up this tick
    pub jump_pressed: bool,
    pub jump_released: bool,
    /// Shoot button went down / up this tick
    pub shoot_pressed: bool,
    pub shoot_released: bool,
    /// Abort any charge in progress
    pub cancel: bool,
    /// Weapon wheel notches (sign gives direction)
    pub weapon_scroll: i32,
    /// Aim point in world space
    pub aim: Vec2,
    /// Start a new match (only honored after victory)
    pub restart: bool,
}

impl TickInput {
    /// Held direction: -1, 0 or 1
    pub fn movement(&self) -> f32 {
        self.move_right as i32 as f32 - self.move_left as i32 as f32
    }
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;
    let dt_scale = dt * TARGET_FPS;

    match state.phase() {
        MatchPhase::Victory { .. } => {
            if input.restart {
                state.restart();
            }
        }
        MatchPhase::Playing => {
            if state.countdown.advance(dt) > 0 && state.countdown.is_finished() {
                state.time_out();
            } else {
                handle_turn_input(state, input, dt_scale);
            }
        }
        MatchPhase::Airborne => state.step_projectile(dt),
        MatchPhase::TransitionDelay => {
            if state.advance_transition(dt) {
                state.finish_transition();
            }
        }
    }

    // Movement only counts for the active player while their turn is live
    let movement = if state.phase() == MatchPhase::Playing {
        input.movement()
    } else {
        0.0
    };
    state.update_players(movement, dt_scale);
    state.update_particles(dt, dt_scale);
    state.update_camera();
}

/// Jump, aim, fire and weapon selection for the active player
fn handle_turn_input(state: &mut MatchState, input: &TickInput, dt_scale: f32) {
    let active = state.active;

    let player = state.active_player_mut();
    if input.weapon_scroll != 0 {
        player.cycle_weapon(input.weapon_scroll);
    }
    if input.jump_pressed {
        player.begin_jump_charge();
    }
    if input.shoot_pressed {
        player.aiming = true;
    }

    if input.cancel {
        let had_charge = player.jump_charge.is_some() || player.aiming;
        player.cancel_charges();
        state.clear_preview();
        if had_charge {
            state.push_event(MatchEvent::ChargeCancelled { player: active });
        }
        return;
    }

    let player = state.active_player_mut();
    player.charge_jump(dt_scale);
    if input.jump_released && player.release_jump() {
        state.push_event(MatchEvent::Jumped { player: active });
    }

    if !state.active_player().aiming {
        return;
    }
    if input.shoot_released {
        let origin = state.active_player().center();
        state.fire_projectile(origin, input.aim);
    } else {
        state.refresh_preview(input.aim);
    }
}
