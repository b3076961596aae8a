use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;

use crate::api::error::{EngineError, EngineResult};
use crate::assets::manifest::{SpriteDescriptor, SpriteManifest};
use crate::components::sprite::Sprite;
use crate::core::geometry::{Mask, Rect};

/// Registry of named sprites, built from a [`SpriteManifest`].
/// Sprites are shared; every entity showing one holds the same `Arc`.
pub struct SpriteRegistry {
    sprites: HashMap<String, Arc<Sprite>>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self {
            sprites: HashMap::new(),
        }
    }

    /// Build a registry from a parsed manifest.
    pub fn from_manifest(manifest: &SpriteManifest) -> EngineResult<Self> {
        let mut sprites = HashMap::with_capacity(manifest.sprites.len());
        for (name, desc) in &manifest.sprites {
            sprites.insert(name.clone(), Arc::new(build_sprite(name, desc)?));
        }
        log::debug!("loaded {} sprites", sprites.len());
        Ok(Self { sprites })
    }

    /// Parse and build in one step.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Self::from_manifest(&SpriteManifest::from_json(json)?)
    }

    /// Register a sprite built in code, replacing any of the same name.
    pub fn insert(&mut self, sprite: Sprite) -> Arc<Sprite> {
        let sprite = Arc::new(sprite);
        self.sprites.insert(sprite.name.clone(), Arc::clone(&sprite));
        sprite
    }

    /// Look up a sprite by name. Returns None if not found.
    pub fn get(&self, name: &str) -> Option<Arc<Sprite>> {
        self.sprites.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn build_sprite(name: &str, desc: &SpriteDescriptor) -> EngineResult<Sprite> {
    let invalid = |reason: String| EngineError::InvalidAsset {
        name: name.to_owned(),
        reason,
    };

    if desc.width < 0.0 || desc.height < 0.0 {
        return Err(invalid(format!("negative size {}x{}", desc.width, desc.height)));
    }

    let mut sprite = Sprite::new(name, desc.width, desc.height)
        .with_origin(Vec2::new(desc.origin_x, desc.origin_y))
        .with_frames(desc.frames, desc.fps);

    if let Some(b) = desc.bbox {
        sprite = sprite.with_bbox(Rect::new(b.x, b.y, b.width, b.height));
    }

    if !desc.masks.is_empty() {
        let masks = desc
            .masks
            .iter()
            .enumerate()
            .map(|(frame, rows)| parse_mask(rows).ok_or_else(|| invalid(format!("mask {frame} has ragged rows"))))
            .collect::<EngineResult<Vec<_>>>()?;
        sprite = sprite.with_masks(masks);
    }

    Ok(sprite)
}

fn parse_mask(rows: &[String]) -> Option<Mask> {
    let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
    let mut bits = Vec::with_capacity(width * rows.len());
    for row in rows {
        if row.chars().count() != width {
            return None;
        }
        bits.extend(row.chars().map(|c| c == '#'));
    }
    Mask::new(width as u32, rows.len() as u32, bits)
}
