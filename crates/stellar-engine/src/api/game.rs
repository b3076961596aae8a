use serde::{Deserialize, Serialize};

use crate::api::context::Context;
use crate::api::error::{EngineError, EventResult};
use crate::api::types::{EntityId, Side};
use crate::input::queue::InputEvent;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Display width in pixels (default: 640).
    pub width: f32,
    /// Display height in pixels (default: 480).
    pub height: f32,
    /// Target frame rate (default: 60).
    pub fps: f32,
    /// Scale speeds and alarms by real frame time (default: off).
    pub delta: bool,
    /// Delta timing pretends the frame rate never drops below this (default: 15).
    pub delta_min: f32,
    /// Upper bound on create/destroy cascades resolved at one frame boundary.
    pub max_flush_rounds: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            fps: 60.0,
            delta: false,
            delta_min: 15.0,
            max_flush_rounds: 64,
        }
    }
}

impl GameConfig {
    /// Parse a configuration from a JSON string. Missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Game-level notifications. Every method is optional.
pub trait Game {
    /// Return engine configuration. Called once when the simulation is built.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    fn game_start(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn game_end(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn begin_step(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn step(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    fn end_step(&mut self, _ctx: &mut Context) -> EventResult {
        Ok(())
    }

    /// Input while running, delivered before any entity sees it.
    fn input(&mut self, _ctx: &mut Context, _event: &InputEvent) -> EventResult {
        Ok(())
    }

    /// Input while paused. Nothing else runs while paused.
    fn paused_input(&mut self, _ctx: &mut Context, _event: &InputEvent) -> EventResult {
        Ok(())
    }

    /// The pointer touched an entity. `side` is the pointer side the entity
    /// entered through, `None` if the pointer was already over it.
    fn mouse_collision(
        &mut self,
        _ctx: &mut Context,
        _other: EntityId,
        _side: Option<Side>,
    ) -> EventResult {
        Ok(())
    }

    /// A notification handler failed. The frame has carried on regardless.
    fn fault(&mut self, _fault: &EngineError) {}
}

/// A game with no game-level logic.
impl Game for () {}
