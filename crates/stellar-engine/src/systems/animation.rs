//! Animation system: advances entity images once per frame.

use crate::api::types::EntityId;
use crate::core::registry::Registry;

/// Advance the image of every active entity in `ids`.
///
/// An image playing at `image.fps()` moves `image_fps / fps * delta_mult`
/// frames per tick. Returns the entities whose animation wrapped, in the
/// order given.
pub fn tick_animations(registry: &mut Registry, ids: &[EntityId], fps: f32, delta_mult: f32) -> Vec<EntityId> {
    if fps <= 0.0 {
        return Vec::new();
    }

    let mut ended = Vec::new();
    for &id in ids {
        let Some(entity) = registry.get_mut(id) else {
            continue;
        };
        if !entity.is_active() {
            continue;
        }
        let frames = entity.image.fps() / fps * delta_mult;
        if entity.image.advance(frames) {
            ended.push(id);
        }
    }
    ended
}
