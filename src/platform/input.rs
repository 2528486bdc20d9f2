//! Device input translated into per-tick commands
//!
//! Key handlers set flags as events arrive; the frame loop takes one
//! [`TickInput`] per tick and one-shot presses are cleared once consumed.

use crate::sim::TickInput;

/// A game action a key is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
    Shoot,
    Left,
    Right,
    Pause,
}

impl Action {
    /// Default key bindings (DOM `KeyboardEvent.key` names)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "ArrowUp" | "w" | "W" => Some(Action::Jump),
            "x" | "X" | "f" | "F" | "Enter" => Some(Action::Shoot),
            "ArrowLeft" | "a" | "A" => Some(Action::Left),
            "ArrowRight" | "d" | "D" => Some(Action::Right),
            "Escape" | "p" | "P" => Some(Action::Pause),
            _ => None,
        }
    }
}

/// Latched input between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    jump_pressed: bool,
    jump_held: bool,
    shoot_pressed: bool,
    left: bool,
    right: bool,
    pause_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        match action {
            Action::Jump => {
                // Key repeat must not trigger the double jump
                if !self.jump_held {
                    self.jump_pressed = true;
                }
                self.jump_held = true;
            }
            Action::Shoot => self.shoot_pressed = true,
            Action::Left => self.left = true,
            Action::Right => self.right = true,
            Action::Pause => self.pause_pressed = true,
        }
    }

    pub fn release(&mut self, action: Action) {
        match action {
            Action::Jump => self.jump_held = false,
            Action::Left => self.left = false,
            Action::Right => self.right = false,
            Action::Shoot | Action::Pause => {}
        }
    }

    /// Route a raw key event; unbound keys are ignored
    pub fn handle_key(&mut self, key: &str, down: bool) {
        let Some(action) = Action::from_key(key) else {
            return;
        };
        if down {
            self.press(action);
        } else {
            self.release(action);
        }
    }

    /// Command for the next tick without consuming one-shot presses
    pub fn peek(&self) -> TickInput {
        TickInput {
            jump: self.jump_pressed,
            jump_held: self.jump_held,
            shoot: self.shoot_pressed,
            left: self.left,
            right: self.right,
            pause: self.pause_pressed,
        }
    }

    /// Command for the next tick; clears one-shot presses
    pub fn take(&mut self) -> TickInput {
        let input = self.peek();
        self.clear_one_shots();
        input
    }

    pub fn clear_one_shots(&mut self) {
        self.jump_pressed = false;
        self.shoot_pressed = false;
        self.pause_pressed = false;
    }

    /// Drop everything, e.g. when the window loses focus
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shots_cleared_after_take() {
        let mut input = InputState::new();
        input.handle_key(" ", true);
        input.handle_key("x", true);
        let first = input.take();
        assert!(first.jump && first.jump_held && first.shoot);

        let second = input.take();
        assert!(!second.jump && !second.shoot);
        assert!(second.jump_held);
    }

    #[test]
    fn test_key_repeat_does_not_rejump() {
        let mut input = InputState::new();
        input.handle_key("ArrowUp", true);
        input.take();
        input.handle_key("ArrowUp", true);
        assert!(!input.peek().jump);

        input.handle_key("ArrowUp", false);
        input.handle_key("ArrowUp", true);
        assert!(input.peek().jump);
    }

    #[test]
    fn test_held_movement_persists() {
        let mut input = InputState::new();
        input.handle_key("a", true);
        assert!(input.take().left);
        assert!(input.take().left);
        input.handle_key("a", false);
        assert!(!input.take().left);
    }

    #[test]
    fn test_unbound_keys_ignored() {
        let mut input = InputState::new();
        input.handle_key("q", true);
        assert_eq!(input.peek(), TickInput::default());
    }
}
