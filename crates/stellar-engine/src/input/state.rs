//! Held-input state, rebuilt from the events the scheduler drains.

use std::collections::{HashMap, HashSet};

use super::queue::InputEvent;

/// What is currently held down, and the last reported analog positions.
/// Unknown keys, buttons, axes and hats read as released or centered.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashSet<String>,
    mouse_buttons: HashSet<u8>,
    joystick_buttons: HashSet<(u32, u32)>,
    axes: HashMap<(u32, u32), f32>,
    hats: HashMap<(u32, u32), (i8, i8)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyPress { key, .. } => {
                self.keys.insert(key.clone());
            }
            InputEvent::KeyRelease { key } => {
                self.keys.remove(key);
            }
            InputEvent::MouseButtonPress { button } => {
                self.mouse_buttons.insert(*button);
            }
            InputEvent::MouseButtonRelease { button } => {
                self.mouse_buttons.remove(button);
            }
            InputEvent::JoystickAxisMove { joystick, axis, value } => {
                self.axes.insert((*joystick, *axis), value.clamp(-1.0, 1.0));
            }
            InputEvent::JoystickHatMove { joystick, hat, x, y } => {
                self.hats.insert((*joystick, *hat), ((*x).signum(), (*y).signum()));
            }
            InputEvent::JoystickButtonPress { joystick, button } => {
                self.joystick_buttons.insert((*joystick, *button));
            }
            InputEvent::JoystickButtonRelease { joystick, button } => {
                self.joystick_buttons.remove(&(*joystick, *button));
            }
            InputEvent::MouseMove { .. } | InputEvent::Close => {}
        }
    }

    pub fn key_pressed(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Button 0 is the first mouse button.
    pub fn mouse_button_pressed(&self, button: u8) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Axis position in `-1.0..=1.0`; 0 when never reported.
    pub fn joystick_axis(&self, joystick: u32, axis: u32) -> f32 {
        self.axes.get(&(joystick, axis)).copied().unwrap_or(0.0)
    }

    /// Hat direction as `(x, y)`, each -1, 0 or 1; centered when never reported.
    pub fn joystick_hat(&self, joystick: u32, hat: u32) -> (i8, i8) {
        self.hats.get(&(joystick, hat)).copied().unwrap_or((0, 0))
    }

    pub fn joystick_button_pressed(&self, joystick: u32, button: u32) -> bool {
        self.joystick_buttons.contains(&(joystick, button))
    }

    /// Forget everything held. Used when the game restarts.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_and_buttons_follow_press_and_release() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyPress { key: "left".into(), ch: None });
        state.apply(&InputEvent::MouseButtonPress { button: 0 });
        state.apply(&InputEvent::JoystickButtonPress { joystick: 1, button: 3 });
        assert!(state.key_pressed("left"));
        assert!(!state.key_pressed("right"));
        assert!(state.mouse_button_pressed(0));
        assert!(state.joystick_button_pressed(1, 3));
        assert!(!state.joystick_button_pressed(0, 3));

        state.apply(&InputEvent::KeyRelease { key: "left".into() });
        state.apply(&InputEvent::MouseButtonRelease { button: 0 });
        state.apply(&InputEvent::JoystickButtonRelease { joystick: 1, button: 3 });
        assert!(!state.key_pressed("left"));
        assert!(!state.mouse_button_pressed(0));
        assert!(!state.joystick_button_pressed(1, 3));
    }

    #[test]
    fn analog_inputs_keep_last_value() {
        let mut state = InputState::new();
        assert_eq!(state.joystick_axis(0, 1), 0.0);
        assert_eq!(state.joystick_hat(0, 0), (0, 0));

        state.apply(&InputEvent::JoystickAxisMove { joystick: 0, axis: 1, value: -0.25 });
        state.apply(&InputEvent::JoystickAxisMove { joystick: 0, axis: 2, value: 3.0 });
        state.apply(&InputEvent::JoystickHatMove { joystick: 0, hat: 0, x: 1, y: -1 });
        assert_eq!(state.joystick_axis(0, 1), -0.25);
        assert_eq!(state.joystick_axis(0, 2), 1.0);
        assert_eq!(state.joystick_hat(0, 0), (1, -1));

        state.apply(&InputEvent::JoystickHatMove { joystick: 0, hat: 0, x: 0, y: 0 });
        assert_eq!(state.joystick_hat(0, 0), (0, 0));
    }

    #[test]
    fn releasing_unknown_input_is_harmless() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyRelease { key: "q".into() });
        state.apply(&InputEvent::Close);
        assert!(!state.key_pressed("q"));
    }
}
