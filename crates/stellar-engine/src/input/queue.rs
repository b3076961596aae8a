/// Pre-decoded input events the core redistributes as notifications.
/// Device polling and key mapping belong to the input backend.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key was pressed. `key` is the key name, `ch` the typed character.
    KeyPress { key: String, ch: Option<char> },
    /// A key was released.
    KeyRelease { key: String },
    /// The pointer moved to room coordinates (x, y).
    MouseMove { x: f32, y: f32 },
    MouseButtonPress { button: u8 },
    MouseButtonRelease { button: u8 },
    JoystickAxisMove { joystick: u32, axis: u32, value: f32 },
    JoystickHatMove { joystick: u32, hat: u32, x: i8, y: i8 },
    JoystickButtonPress { joystick: u32, button: u32 },
    JoystickButtonRelease { joystick: u32, button: u32 },
    /// The user asked to close the game.
    Close,
}

/// A queue of input events.
/// The backend pushes events between frames; the scheduler drains them
/// once per frame after the begin-step phase.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event.
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::MouseMove { x: 10.0, y: 20.0 });
        q.push(InputEvent::KeyPress { key: "space".into(), ch: Some(' ') });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
        assert_eq!(events[1], InputEvent::KeyPress { key: "space".into(), ch: Some(' ') });
    }

    #[test]
    fn iter_does_not_consume() {
        let mut q = InputQueue::new();
        q.push(InputEvent::JoystickHatMove { joystick: 0, hat: 1, x: -1, y: 0 });
        assert_eq!(q.iter().count(), 1);
        assert_eq!(q.len(), 1);
    }
}
