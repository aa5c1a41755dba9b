//! Polled input state
//!
//! Window and device events are folded into an [`InputState`] by the app, and the
//! scene queries it during `update`. Mouse motion accumulates until
//! [`InputState::end_frame`].

use std::collections::HashSet;

use winit::{event::MouseButton, keyboard::KeyCode};

#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    mouse_delta: (f32, f32),
    keyboard_captured: bool,
    mouse_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Marks keyboard and mouse as owned by the UI for this frame.
    pub fn set_capture(&mut self, keyboard: bool, mouse: bool) {
        self.keyboard_captured = keyboard;
        self.mouse_captured = mouse;
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        !self.keyboard_captured && self.keys.contains(&key)
    }

    pub fn mouse_button_down(&self, button: MouseButton) -> bool {
        !self.mouse_captured && self.buttons.contains(&button)
    }

    pub fn mouse_delta(&self) -> (f32, f32) {
        if self.mouse_captured {
            (0.0, 0.0)
        } else {
            self.mouse_delta
        }
    }

    pub fn end_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
    }

    /// Drops every held key and button, used when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_and_release() {
        let mut input = InputState::new();
        input.set_key(KeyCode::KeyW, true);
        assert!(input.key_down(KeyCode::KeyW));
        input.set_key(KeyCode::KeyW, false);
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn test_mouse_delta_accumulates_until_end_frame() {
        let mut input = InputState::new();
        input.add_mouse_motion(2.0, -1.0);
        input.add_mouse_motion(3.0, 4.0);
        assert_eq!(input.mouse_delta(), (5.0, 3.0));
        input.end_frame();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_capture_hides_input() {
        let mut input = InputState::new();
        input.set_key(KeyCode::Space, true);
        input.set_mouse_button(MouseButton::Left, true);
        input.add_mouse_motion(1.0, 1.0);
        input.set_capture(true, true);

        assert!(!input.key_down(KeyCode::Space));
        assert!(!input.mouse_button_down(MouseButton::Left));
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }
}
