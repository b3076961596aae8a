//! Image state for an entity: current sprite, animation frame and the
//! transform a renderer applies when drawing it.

use std::sync::Arc;

use crate::components::sprite::Sprite;

/// How an entity is drawn and animated.
#[derive(Debug, Clone)]
pub struct Image {
    pub sprite: Option<Arc<Sprite>>,
    pub visible: bool,
    /// Current animation position in frames. The drawn frame is the integer part.
    pub index: f32,
    /// Animation rate in frames per second. `None` uses the sprite's suggestion.
    pub fps: Option<f32>,
    pub xscale: f32,
    pub yscale: f32,
    /// Rotation in degrees, counter-clockwise.
    pub rotation: f32,
    /// 255 is opaque, 0 fully transparent.
    pub alpha: u8,
    /// RGB color blended with the sprite.
    pub blend: Option<[u8; 3]>,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            sprite: None,
            visible: true,
            index: 0.0,
            fps: None,
            xscale: 1.0,
            yscale: 1.0,
            rotation: 0.0,
            alpha: 255,
            blend: None,
        }
    }
}

impl Image {
    pub fn with_sprite(sprite: Arc<Sprite>) -> Self {
        Self {
            sprite: Some(sprite),
            ..Default::default()
        }
    }

    /// Number of frames in the current sprite (0 without a sprite).
    pub fn frame_count(&self) -> u32 {
        self.sprite.as_ref().map(|s| s.frames).unwrap_or(0)
    }

    /// Effective animation rate.
    pub fn fps(&self) -> f32 {
        match (self.fps, &self.sprite) {
            (Some(fps), _) => fps,
            (None, Some(sprite)) => sprite.fps,
            (None, None) => 0.0,
        }
    }

    /// Frame currently displayed.
    pub fn frame(&self) -> u32 {
        let count = self.frame_count();
        if count == 0 {
            return 0;
        }
        (self.index.floor() as i64).rem_euclid(count as i64) as u32
    }

    /// Move the animation forward by `frames` (negative plays backwards).
    /// Returns true when a cycle ended, in either direction.
    pub fn advance(&mut self, frames: f32) -> bool {
        let count = self.frame_count() as f32;
        if count == 0.0 || frames == 0.0 || !frames.is_finite() {
            return false;
        }

        self.index += frames;
        let wrapped = !(0.0..count).contains(&self.index);
        self.index = self.index.rem_euclid(count);
        // rem_euclid of a tiny negative can round up to `count`.
        if self.index >= count {
            self.index = 0.0;
        }
        wrapped
    }
}
