use std::cmp::Ordering;

use crate::components::entity::Entity;
use crate::core::geometry::Rect;
use crate::core::registry::Registry;
use crate::core::room::View;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Area an entity's image covers in room coordinates, ignoring rotation.
pub fn image_rect(entity: &Entity) -> Option<Rect> {
    let sprite = entity.image.sprite.as_ref()?;
    let xs = entity.image.xscale;
    let ys = entity.image.yscale;
    let left = entity.pos.x - sprite.origin.x * xs;
    let top = entity.pos.y - sprite.origin.y * ys;
    let right = left + sprite.width * xs;
    let bottom = top + sprite.height * ys;
    Some(Rect {
        left: left.min(right),
        top: top.min(bottom),
        right: left.max(right),
        bottom: top.max(bottom),
    })
}

/// Build the draw list for one view.
/// Only visible entities with a sprite that overlaps the view are emitted,
/// ordered by z, ties kept in creation order.
pub fn build_render_buffer(registry: &Registry, view: &View, buffer: &mut RenderBuffer) {
    buffer.clear();

    let mut drawn: Vec<&Entity> = registry
        .iter()
        .filter(|e| e.image.visible)
        .filter(|e| image_rect(e).is_some_and(|r| view.contains(&r)))
        .collect();

    // Stable sort: equal z keeps registry (creation) order.
    drawn.sort_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(Ordering::Equal));

    for entity in drawn {
        let Some(sprite) = entity.image.sprite.as_ref() else {
            continue;
        };
        let screen = view.room_to_screen(entity.pos);
        let instance = RenderInstance {
            entity: entity.id().0,
            frame: entity.image.frame(),
            x: screen.x,
            y: screen.y,
            z: entity.z,
            xscale: entity.image.xscale,
            yscale: entity.image.yscale,
            rotation: entity.image.rotation,
            alpha: entity.image.alpha as f32 / 255.0,
            blend: RenderInstance::pack_rgb(entity.image.blend.unwrap_or([255, 255, 255])),
        };
        buffer.push(&sprite.name, instance);
    }
}
