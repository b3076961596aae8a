use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::error::EngineResult;

/// Sprite metadata for a game, supplied by the asset pipeline as JSON.
/// The core only needs sizes and collision data; pixel data stays with
/// the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteManifest {
    /// Named sprites.
    #[serde(default)]
    pub sprites: BTreeMap<String, SpriteDescriptor>,
}

/// Describes one sprite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    pub width: f32,
    pub height: f32,
    /// Pixel of the image placed at the entity position (default: 0, 0).
    #[serde(default)]
    pub origin_x: f32,
    #[serde(default)]
    pub origin_y: f32,
    /// Number of animation frames (default: 1).
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Suggested animation rate in frames per second (default: 0).
    #[serde(default)]
    pub fps: f32,
    /// Suggested bounding box relative to the origin. Defaults to the
    /// whole image.
    #[serde(default)]
    pub bbox: Option<BoxDescriptor>,
    /// Per-frame collision masks, one string per row: `#` is solid,
    /// anything else is empty.
    #[serde(default)]
    pub masks: Vec<Vec<String>>,
}

/// A rectangle as `x, y, width, height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDescriptor {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

fn default_frames() -> u32 {
    1
}

impl SpriteManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
