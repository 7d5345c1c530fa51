//! Input event folding
//!
//! Hosts push raw events as they arrive; once per simulation tick the state
//! is snapshotted into a [`TickInput`] and the one-shot edges are cleared.

use glam::Vec2;

use crate::sim::state::Camera;
use crate::sim::tick::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    /// Jump (hold to charge)
    Up,
    /// Start a new match after victory
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Aim and shoot
    Left,
    /// Cancel a charge
    Right,
}

/// Raw platform input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Wheel notches, positive away from the user
    Wheel(i32),
    /// Cursor position in window pixels
    CursorMoved(Vec2),
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    pending: TickInput,
    cursor: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        let input = &mut self.pending;
        match event {
            InputEvent::KeyDown(Key::Left) => input.move_left = true,
            InputEvent::KeyUp(Key::Left) => input.move_left = false,
            InputEvent::KeyDown(Key::Right) => input.move_right = true,
            InputEvent::KeyUp(Key::Right) => input.move_right = false,
            InputEvent::KeyDown(Key::Up) => input.jump_pressed = true,
            InputEvent::KeyUp(Key::Up) => input.jump_released = true,
            InputEvent::KeyDown(Key::Restart) => input.restart = true,
            InputEvent::KeyUp(Key::Restart) => {}
            InputEvent::MouseDown(MouseButton::Left) => input.shoot_pressed = true,
            InputEvent::MouseUp(MouseButton::Left) => input.shoot_released = true,
            InputEvent::MouseDown(MouseButton::Right) => input.cancel = true,
            InputEvent::MouseUp(MouseButton::Right) => {}
            InputEvent::Wheel(notches) => input.weapon_scroll += notches,
            InputEvent::CursorMoved(pos) => self.cursor = pos,
        }
    }

    /// Commands for the next tick, aim converted to world space
    pub fn tick_input(&self, camera: &Camera, render_scale: f32) -> TickInput {
        TickInput {
            aim: camera.screen_to_world(self.cursor, render_scale),
            ..self.pending.clone()
        }
    }

    /// Clear one-shot edges after a tick consumed them
    pub fn end_tick(&mut self) {
        let input = &mut self.pending;
        input.jump_pressed = false;
        input.jump_released = false;
        input.shoot_pressed = false;
        input.shoot_released = false;
        input.cancel = false;
        input.weapon_scroll = 0;
        input.restart = false;
    }

    /// Forget held movement (turn handover)
    pub fn clear_held(&mut self) {
        self.pending.move_left = false;
        self.pending.move_right = false;
    }
}
