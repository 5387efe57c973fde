//! Raw input tracking
//!
//! Event handlers only record what is held; the frame loop samples it once
//! per frame into a [`FrameInput`].

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::FrameInput;

const LEFT_KEYS: [&str; 2] = ["KeyA", "ArrowLeft"];
const RIGHT_KEYS: [&str; 2] = ["KeyD", "ArrowRight"];
const DASH_KEY: &str = "Space";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Cannon
    Left,
    /// Missile
    Right,
    Other,
}

impl MouseButton {
    /// From `MouseEvent.button`
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            2 => MouseButton::Right,
            _ => MouseButton::Other,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Pointer in canvas space
    pub pointer: Vec2,
    /// `KeyboardEvent.code` values currently held
    keys: HashSet<String>,
    left_button: bool,
    right_button: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        self.keys.insert(code.to_string());
    }

    pub fn key_up(&mut self, code: &str) {
        self.keys.remove(code);
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.keys.contains(code)
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.pointer = pos;
    }

    pub fn button(&mut self, button: MouseButton, down: bool) {
        match button {
            MouseButton::Left => self.left_button = down,
            MouseButton::Right => self.right_button = down,
            MouseButton::Other => {}
        }
    }

    /// Forget everything held, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.left_button = false;
        self.right_button = false;
    }

    /// Sample the held state for one frame
    pub fn frame_input(&self) -> FrameInput {
        let left = LEFT_KEYS.iter().any(|k| self.is_held(k));
        let right = RIGHT_KEYS.iter().any(|k| self.is_held(k));
        let move_axis = match (left, right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };

        FrameInput {
            move_axis,
            pointer: self.pointer,
            fire_cannon: self.left_button,
            fire_missile: self.right_button,
            dash: self.is_held(DASH_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        let mut input = InputState::new();
        assert_eq!(input.frame_input().move_axis, 0.0);

        input.key_down("KeyA");
        assert_eq!(input.frame_input().move_axis, -1.0);
        input.key_down("ArrowRight");
        assert_eq!(input.frame_input().move_axis, 0.0);
        input.key_up("KeyA");
        assert_eq!(input.frame_input().move_axis, 1.0);
    }

    #[test]
    fn test_buttons_and_dash() {
        let mut input = InputState::new();
        input.pointer_moved(Vec2::new(10.0, 20.0));
        input.button(MouseButton::from_dom(0), true);
        input.button(MouseButton::from_dom(2), true);
        input.key_down("Space");

        let frame = input.frame_input();
        assert_eq!(frame.pointer, Vec2::new(10.0, 20.0));
        assert!(frame.fire_cannon && frame.fire_missile && frame.dash);

        input.button(MouseButton::Left, false);
        assert!(!input.frame_input().fire_cannon);

        input.release_all();
        let frame = input.frame_input();
        assert!(!frame.fire_missile && !frame.dash);
    }
}
