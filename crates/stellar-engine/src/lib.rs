pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::behavior::{Behavior, RoomBehavior, StepPhase};
pub use api::context::{Context, FrameInfo};
pub use api::error::{EngineError, EngineResult, EventResult};
pub use api::game::{Game, GameConfig};
pub use api::types::{Activity, EntityId, Key, Side};
pub use components::alarm::Alarms;
pub use components::animation::Image;
pub use components::entity::Entity;
pub use components::sprite::Sprite;
pub use crate::core::collision::{classify, collides, collisions, detect_contacts, Contact, Filter};
pub use crate::core::geometry::{bodies_collide, Body, CollisionShape, Mask, Rect};
pub use crate::core::registry::Registry;
pub use crate::core::room::{Room, View};
pub use crate::core::scheduler::Simulation;
pub use crate::core::time::{DeltaClock, FrameTimer};
pub use renderer::instance::{RenderBuffer, RenderInstance};
pub use input::queue::{InputEvent, InputQueue};
pub use input::state::InputState;
pub use assets::manifest::SpriteManifest;
pub use assets::registry::SpriteRegistry;
pub use systems::animation::tick_animations;
pub use systems::render::build_render_buffer;

pub use glam::Vec2;
