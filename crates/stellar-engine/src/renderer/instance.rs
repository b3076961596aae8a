use bytemuck::{Pod, Zeroable};

/// Per-instance draw data handed to the renderer collaborator.
/// 10 words = 40 bytes stride, all fields 4 bytes so the struct has no padding.
///
/// Positions are in display coordinates; the renderer applies the sprite
/// origin, scale and rotation itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Raw entity identifier.
    pub entity: u32,
    /// Animation frame to draw.
    pub frame: u32,
    pub x: f32,
    pub y: f32,
    /// Draw depth; smaller values are drawn first.
    pub z: f32,
    pub xscale: f32,
    pub yscale: f32,
    /// Rotation in degrees, counter-clockwise.
    pub rotation: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Blend color packed as 0x00RRGGBB; white when the entity has none.
    pub blend: u32,
}

impl RenderInstance {
    pub const WORDS: usize = 10;
    pub const STRIDE_BYTES: usize = Self::WORDS * 4;

    /// Pack an RGB triple the way `blend` stores it.
    pub fn pack_rgb(rgb: [u8; 3]) -> u32 {
        (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32
    }
}

/// Instances for one view, in draw order.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
    /// Sprite name per instance, parallel to `instances`.
    pub sprites: Vec<String>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(512),
            sprites: Vec::with_capacity(512),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.sprites.clear();
    }

    pub fn push(&mut self, sprite: &str, instance: RenderInstance) {
        self.instances.push(instance);
        self.sprites.push(sprite.to_owned());
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Instance data as raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
