use std::time::Duration;

use glam::Vec2;

use crate::api::behavior::Behavior;
use crate::api::error::EngineResult;
use crate::api::game::GameConfig;
use crate::api::types::{EntityId, Key};
use crate::components::entity::Entity;
use crate::core::collision::{self, Filter};
use crate::core::registry::Registry;
use crate::core::room::View;
use crate::input::state::InputState;

/// Timing of the frame being simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Frames simulated so far, starting at 1 for the first frame.
    pub number: u64,
    /// Wall time since the previous frame.
    pub time_passed: Duration,
    /// Speed multiplier from delta timing; 1.0 when it is disabled.
    pub delta_mult: f32,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            number: 0,
            time_passed: Duration::ZERO,
            delta_mult: 1.0,
        }
    }
}

/// Requests that only take effect once the current frame has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    StartRoom(usize),
    ResumeRoom(usize),
    EndRoom,
    EndGame,
    Pause,
    Unpause,
}

/// Mutable access to the active room, passed to every notification.
pub struct Context<'a> {
    /// Entities of the active room.
    pub entities: &'a mut Registry,
    /// Views of the active room.
    pub views: &'a mut Vec<View>,
    pub frame: FrameInfo,
    pub(crate) commands: &'a mut Vec<Command>,
    pub(crate) config: &'a GameConfig,
    pub(crate) room_index: usize,
    pub(crate) room_size: Vec2,
    pub(crate) mouse: Option<Vec2>,
    pub(crate) held: &'a InputState,
}

impl Context<'_> {
    /// Queue a new entity. It joins the room at the next frame boundary,
    /// when its `create` notification fires.
    pub fn create(&mut self, entity: Entity, behavior: impl Behavior + 'static) -> EntityId {
        self.entities.create(entity, Box::new(behavior))
    }

    /// Destroy an entity at the end of the current frame.
    pub fn destroy(&mut self, id: EntityId) -> EngineResult<()> {
        self.entities.destroy(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Arm an alarm with `ticks` frames, or clear it with `None`.
    pub fn set_alarm(&mut self, id: EntityId, alarm: impl Into<Key>, ticks: Option<f32>) -> EngineResult<()> {
        self.entities.set_alarm(id, alarm.into(), ticks)
    }

    pub fn get_alarm(&self, id: EntityId, alarm: impl Into<Key>) -> Option<f32> {
        self.entities.get_alarm(id, &alarm.into())
    }

    /// Entities `target` collides with, optionally as if it were at `at`.
    pub fn collisions(&self, target: EntityId, filter: &Filter, at: Option<Vec2>) -> Vec<EntityId> {
        collision::collisions(&*self.entities, target, filter, at)
    }

    pub fn collides(&self, a: EntityId, b: EntityId, at: Option<Vec2>) -> bool {
        collision::collides(&*self.entities, a, b, at)
    }

    /// Restart room `index` from its declared state after this frame.
    pub fn start_room(&mut self, index: usize) {
        self.commands.push(Command::StartRoom(index));
    }

    /// Switch to room `index` without resetting it after this frame.
    pub fn resume_room(&mut self, index: usize) {
        self.commands.push(Command::ResumeRoom(index));
    }

    /// Advance to the next room (or end the game) after this frame.
    pub fn end_room(&mut self) {
        self.commands.push(Command::EndRoom);
    }

    pub fn end_game(&mut self) {
        self.commands.push(Command::EndGame);
    }

    pub fn pause(&mut self) {
        self.commands.push(Command::Pause);
    }

    pub fn unpause(&mut self) {
        self.commands.push(Command::Unpause);
    }

    pub fn room_index(&self) -> usize {
        self.room_index
    }

    /// Width and height of the active room.
    pub fn room_size(&self) -> Vec2 {
        self.room_size
    }

    /// Last known pointer position, `None` before the pointer first moves.
    pub fn mouse(&self) -> Option<Vec2> {
        self.mouse
    }

    /// Whether the key named `key` is held down.
    pub fn key_pressed(&self, key: &str) -> bool {
        self.held.key_pressed(key)
    }

    /// Whether mouse button `button` (0 is the first) is held down.
    pub fn mouse_button_pressed(&self, button: u8) -> bool {
        self.held.mouse_button_pressed(button)
    }

    /// Last reported position of a joystick axis, 0 if never moved.
    pub fn joystick_axis(&self, joystick: u32, axis: u32) -> f32 {
        self.held.joystick_axis(joystick, axis)
    }

    pub fn joystick_hat(&self, joystick: u32, hat: u32) -> (i8, i8) {
        self.held.joystick_hat(joystick, hat)
    }

    pub fn joystick_button_pressed(&self, joystick: u32, button: u32) -> bool {
        self.held.joystick_button_pressed(joystick, button)
    }

    pub fn config(&self) -> &GameConfig {
        self.config
    }
}
