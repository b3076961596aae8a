use std::sync::Arc;

use glam::Vec2;

use crate::api::types::{Activity, EntityId};
use crate::components::alarm::Alarms;
use crate::components::animation::Image;
use crate::components::sprite::Sprite;
use crate::core::geometry::{Body, CollisionShape, Mask, PlacedMask, Rect};

/// Simulation object data.
///
/// Fat struct with everything the core needs; per-entity behaviour lives
/// in a separate [`Behavior`](crate::api::behavior::Behavior) owned by the
/// registry next to it.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    requested_id: Option<EntityId>,
    /// Class name, matched by tag filters in collision queries.
    pub tag: String,
    /// Position in the room.
    pub pos: Vec2,
    /// Draw layering key; higher values are drawn in front.
    pub z: f32,
    /// Pixels per frame at `delta_mult == 1`.
    pub velocity: Vec2,
    /// Bounding box offset and size. `None` takes the sprite's suggestion.
    pub bbox_x: Option<f32>,
    pub bbox_y: Option<f32>,
    pub bbox_width: Option<f32>,
    pub bbox_height: Option<f32>,
    pub collision_shape: CollisionShape,
    /// Explicit collision mask, used instead of the sprite's frame masks.
    pub mask: Option<Arc<Mask>>,
    pub activity: Activity,
    pub detects_collisions: bool,
    pub image: Image,
    pub alarms: Alarms,
    start: Vec2,
    previous: Vec2,
    frame_start: Vec2,
}

impl Entity {
    /// Create a new entity at `pos`. The identifier is assigned when the
    /// entity is handed to a registry.
    pub fn new(pos: Vec2) -> Self {
        Self {
            id: EntityId(0),
            requested_id: None,
            tag: String::new(),
            pos,
            z: 0.0,
            velocity: Vec2::ZERO,
            bbox_x: None,
            bbox_y: None,
            bbox_width: None,
            bbox_height: None,
            collision_shape: CollisionShape::Rectangle,
            mask: None,
            activity: Activity::Active,
            detects_collisions: true,
            image: Image::default(),
            alarms: Alarms::new(),
            start: pos,
            previous: pos,
            frame_start: pos,
        }
    }

    // -- Builder pattern --

    /// Ask for a specific identifier. If it is taken the registry assigns
    /// a fresh one instead.
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.requested_id = Some(id);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Explicit bounding box relative to the position.
    pub fn with_bbox(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.bbox_x = Some(x);
        self.bbox_y = Some(y);
        self.bbox_width = Some(width);
        self.bbox_height = Some(height);
        self
    }

    pub fn with_shape(mut self, shape: CollisionShape) -> Self {
        self.collision_shape = shape;
        self
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(Arc::new(mask));
        self
    }

    pub fn with_sprite(mut self, sprite: Arc<Sprite>) -> Self {
        self.image.sprite = Some(sprite);
        self
    }

    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activity = activity;
        self
    }

    pub fn with_collisions(mut self, detects: bool) -> Self {
        self.detects_collisions = detects;
        self
    }

    // -- Identity and history --

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn requested_id(&self) -> Option<EntityId> {
        self.requested_id
    }

    /// Bind the entity to its registry identifier and record the creation
    /// position.
    pub(crate) fn assign(&mut self, id: EntityId) {
        self.id = id;
        self.start = self.pos;
        self.previous = self.pos;
        self.frame_start = self.pos;
    }

    /// Position when the entity was created.
    pub fn start(&self) -> Vec2 {
        self.start
    }

    /// Position at the end of the previous frame.
    pub fn previous(&self) -> Vec2 {
        self.previous
    }

    /// Position at the start of the frame being simulated.
    pub fn frame_start(&self) -> Vec2 {
        self.frame_start
    }

    pub(crate) fn begin_frame(&mut self) {
        self.frame_start = self.pos;
    }

    pub(crate) fn commit_previous(&mut self) {
        self.previous = self.frame_start;
    }

    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }

    // -- Motion --

    /// Default position update: `pos += velocity * delta_mult`.
    pub fn integrate(&mut self, delta_mult: f32) {
        self.pos += self.velocity * delta_mult;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Direction of motion in degrees; 0 is right, counter-clockwise
    /// positive (y grows downward).
    pub fn move_direction(&self) -> f32 {
        (-self.velocity.y).atan2(self.velocity.x).to_degrees()
    }

    pub fn set_speed(&mut self, speed: f32) {
        let dir = self.move_direction().to_radians();
        self.velocity = Vec2::new(dir.cos(), -dir.sin()) * speed;
    }

    pub fn set_move_direction(&mut self, degrees: f32) {
        let speed = self.speed();
        let dir = degrees.to_radians();
        self.velocity = Vec2::new(dir.cos(), -dir.sin()) * speed;
    }

    // -- Bounds --

    fn sprite_bbox(&self) -> Rect {
        self.image
            .sprite
            .as_ref()
            .map(|s| s.bbox)
            .unwrap_or_default()
    }

    /// Bounding box offset and size, resolved against the sprite hint.
    pub fn bbox_local(&self) -> Rect {
        let hint = self.sprite_bbox();
        Rect::new(
            self.bbox_x.unwrap_or(hint.left),
            self.bbox_y.unwrap_or(hint.top),
            self.bbox_width.unwrap_or(hint.width()),
            self.bbox_height.unwrap_or(hint.height()),
        )
    }

    /// Bounding box in room coordinates at the current position.
    pub fn bbox(&self) -> Rect {
        self.bbox_at(self.pos)
    }

    /// Bounding box as if the entity were at `pos`.
    pub fn bbox_at(&self, pos: Vec2) -> Rect {
        self.bbox_local().translate(pos)
    }

    pub fn bbox_left(&self) -> f32 {
        self.bbox().left
    }

    pub fn bbox_right(&self) -> f32 {
        self.bbox().right
    }

    pub fn bbox_top(&self) -> f32 {
        self.bbox().top
    }

    pub fn bbox_bottom(&self) -> f32 {
        self.bbox().bottom
    }

    /// Room position of the mask's top-left pixel.
    pub fn mask_origin(&self) -> Vec2 {
        self.mask_origin_at(self.pos)
    }

    fn mask_origin_at(&self, pos: Vec2) -> Vec2 {
        match &self.image.sprite {
            Some(sprite) => pos - sprite.origin,
            None => pos,
        }
    }

    /// Mask used for precise collisions, if any.
    pub fn collision_mask(&self) -> Option<&Mask> {
        if let Some(mask) = &self.mask {
            return Some(mask.as_ref());
        }
        let sprite = self.image.sprite.as_ref()?;
        sprite.frame_mask(self.image.frame())
    }

    /// Collision body as if the entity were at `pos`, without moving it.
    pub fn body_at(&self, pos: Vec2) -> Body<'_> {
        let mask = match self.collision_shape {
            CollisionShape::Precise => self.collision_mask().map(|mask| PlacedMask {
                mask,
                origin: self.mask_origin_at(pos),
            }),
            _ => None,
        };
        Body {
            bbox: self.bbox_at(pos),
            shape: self.collision_shape,
            mask,
        }
    }

    pub fn body(&self) -> Body<'_> {
        self.body_at(self.pos)
    }
}
