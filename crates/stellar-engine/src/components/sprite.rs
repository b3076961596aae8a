use std::sync::Arc;

use glam::Vec2;

use crate::core::geometry::{Mask, Rect};

/// Opaque sprite handle supplied by the asset collaborator.
///
/// The core never decodes images; it only needs sizes, the origin, the
/// frame count, the suggested animation rate, a suggested bounding box and
/// optionally per-frame masks for precise collisions.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub name: String,
    pub width: f32,
    pub height: f32,
    /// Pixel of the image placed at the entity position.
    pub origin: Vec2,
    pub frames: u32,
    /// Suggested animation rate in frames per second.
    pub fps: f32,
    /// Suggested bounding box, relative to the origin.
    pub bbox: Rect,
    masks: Vec<Arc<Mask>>,
}

impl Sprite {
    /// A single-frame sprite whose bounding box covers the whole image.
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            origin: Vec2::ZERO,
            frames: 1,
            fps: 0.0,
            bbox: Rect::new(0.0, 0.0, width, height),
            masks: Vec::new(),
        }
    }

    /// Move the origin. The default bounding box follows so it keeps
    /// covering the image.
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.bbox = self.bbox.translate(self.origin - origin);
        self.origin = origin;
        self
    }

    pub fn with_frames(mut self, frames: u32, fps: f32) -> Self {
        self.frames = frames.max(1);
        self.fps = fps;
        self
    }

    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = bbox;
        self
    }

    /// Attach one mask per animation frame (or a single mask for all frames).
    pub fn with_masks(mut self, masks: Vec<Mask>) -> Self {
        self.masks = masks.into_iter().map(Arc::new).collect();
        self
    }

    /// Mask for the given frame, wrapping when fewer masks than frames exist.
    pub fn frame_mask(&self, frame: u32) -> Option<&Mask> {
        if self.masks.is_empty() {
            return None;
        }
        let i = frame as usize % self.masks.len();
        Some(self.masks[i].as_ref())
    }
}
