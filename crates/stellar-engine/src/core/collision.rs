//! Collision queries and the per-frame contact pass.
//!
//! Queries test one entity against the room on demand. The contact pass
//! runs once per frame from the scheduler: a sweep-and-prune broad phase on
//! x over every detection-enabled entity, the shape test on surviving
//! pairs, then entry-side classification against frame-start positions.

use std::cmp::Ordering;
use std::collections::HashSet;

use glam::Vec2;

use crate::api::types::{EntityId, Side};
use crate::components::entity::Entity;
use crate::core::geometry::{bodies_collide, Body, Rect};
use crate::core::registry::Registry;

/// Which entities a collision query considers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Id(EntityId),
    Ids(HashSet<EntityId>),
    /// Entities whose tag (class name) equals the string.
    Tag(String),
}

impl Filter {
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => entity.id() == *id,
            Filter::Ids(ids) => ids.contains(&entity.id()),
            Filter::Tag(tag) => entity.tag == *tag,
        }
    }
}

impl From<EntityId> for Filter {
    fn from(id: EntityId) -> Self {
        Filter::Id(id)
    }
}

impl From<&str> for Filter {
    fn from(tag: &str) -> Self {
        Filter::Tag(tag.to_string())
    }
}

/// Whether `a`, placed at `at` (or where it is), collides with `b`.
///
/// Unknown identifiers, self-tests and entities with collision detection
/// disabled all answer `false`.
pub fn collides(registry: &Registry, a: EntityId, b: EntityId, at: Option<Vec2>) -> bool {
    if a == b {
        return false;
    }
    let (Some(ea), Some(eb)) = (registry.get(a), registry.get(b)) else {
        return false;
    };
    if !ea.detects_collisions || !eb.detects_collisions {
        return false;
    }
    bodies_collide(&ea.body_at(at.unwrap_or(ea.pos)), &eb.body())
}

/// Every entity matching `filter` that `target` collides with, in creation
/// order. An unknown target yields an empty list.
pub fn collisions(
    registry: &Registry,
    target: EntityId,
    filter: &Filter,
    at: Option<Vec2>,
) -> Vec<EntityId> {
    let Some(me) = registry.get(target) else {
        return Vec::new();
    };
    if !me.detects_collisions {
        return Vec::new();
    }
    let body = me.body_at(at.unwrap_or(me.pos));
    registry
        .iter()
        .filter(|other| other.id() != target && other.detects_collisions)
        .filter(|other| filter.matches(other))
        .filter(|other| bodies_collide(&body, &other.body()))
        .map(|other| other.id())
        .collect()
}

/// Side of `a` that `b` entered through, or `None` when the direction is
/// ambiguous or the pair was already colliding.
///
/// Works on frame-start (`*_prev`) and current (`*_now`) bounding boxes.
/// When the boxes were separated on both axes the axis whose gap closed
/// last decides.
pub fn classify(a_prev: Rect, a_now: Rect, b_prev: Rect, b_now: Rect, was_colliding: bool) -> Option<Side> {
    if was_colliding {
        return None;
    }

    let x_separated = !a_prev.overlaps_x(&b_prev);
    let y_separated = !a_prev.overlaps_y(&b_prev);

    let horizontal = || {
        if b_prev.right <= a_prev.left {
            Side::Left
        } else {
            Side::Right
        }
    };
    let vertical = || {
        if b_prev.bottom <= a_prev.top {
            Side::Top
        } else {
            Side::Bottom
        }
    };

    match (x_separated, y_separated) {
        (true, false) => Some(horizontal()),
        (false, true) => Some(vertical()),
        (false, false) => None,
        (true, true) => {
            let rel = (b_now.center() - b_prev.center()) - (a_now.center() - a_prev.center());
            let t_x = entry_time(a_prev.left, a_prev.right, b_prev.left, b_prev.right, rel.x);
            let t_y = entry_time(a_prev.top, a_prev.bottom, b_prev.top, b_prev.bottom, rel.y);
            match t_x.partial_cmp(&t_y) {
                Some(Ordering::Greater) => Some(horizontal()),
                Some(Ordering::Less) => Some(vertical()),
                _ => None,
            }
        }
    }
}

/// Fraction of the frame's relative motion needed to close the gap on one
/// axis. Infinite when the motion does not close it.
fn entry_time(a_lo: f32, a_hi: f32, b_lo: f32, b_hi: f32, rel: f32) -> f32 {
    let (gap, closing) = if b_hi <= a_lo {
        (a_lo - b_hi, rel)
    } else {
        (b_lo - a_hi, -rel)
    };
    if closing > 0.0 {
        gap / closing
    } else {
        f32::INFINITY
    }
}

/// One notification to deliver: `entity` touched `other` through `side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub entity: EntityId,
    pub other: EntityId,
    pub side: Option<Side>,
}

struct Candidate<'a> {
    order: usize,
    id: EntityId,
    bounds: Rect,
    now: Body<'a>,
    entity: &'a Entity,
}

/// Every contact between detection-enabled entities this frame, both
/// directions of each pair, sorted by the receiving entity's creation order
/// and then the other's.
pub fn detect_contacts(registry: &Registry) -> Vec<Contact> {
    let mut candidates: Vec<Candidate> = registry
        .iter()
        .enumerate()
        .filter(|(_, e)| e.detects_collisions)
        .map(|(order, entity)| {
            let now = entity.body();
            Candidate {
                order,
                id: entity.id(),
                bounds: now.bounds(),
                now,
                entity,
            }
        })
        .collect();

    // Non-finite bodies never collide, so keep them out of the sweep.
    candidates.retain(|c| c.now.is_finite());
    candidates.sort_by(|a, b| a.bounds.left.total_cmp(&b.bounds.left).then(a.order.cmp(&b.order)));

    let mut contacts: Vec<(usize, usize, Contact)> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for i in 0..candidates.len() {
        let left = candidates[i].bounds.left;
        open.retain(|&j| candidates[j].bounds.right > left);

        for &j in &open {
            let (a, b) = (&candidates[j], &candidates[i]);
            if !a.bounds.overlaps_y(&b.bounds) || !bodies_collide(&a.now, &b.now) {
                continue;
            }

            let a_prev = a.entity.body_at(a.entity.frame_start());
            let b_prev = b.entity.body_at(b.entity.frame_start());
            let was_colliding = bodies_collide(&a_prev, &b_prev);

            contacts.push((
                a.order,
                b.order,
                Contact {
                    entity: a.id,
                    other: b.id,
                    side: classify(a_prev.bbox, a.now.bbox, b_prev.bbox, b.now.bbox, was_colliding),
                },
            ));
            contacts.push((
                b.order,
                a.order,
                Contact {
                    entity: b.id,
                    other: a.id,
                    side: classify(b_prev.bbox, b.now.bbox, a_prev.bbox, a.now.bbox, was_colliding),
                },
            ));
        }
        open.push(i);
    }

    contacts.sort_by_key(|&(me, other, _)| (me, other));
    contacts.into_iter().map(|(_, _, c)| c).collect()
}

/// Contacts between a one-pixel pointer and detection-enabled entities.
/// The side is the one of the pointer that the entity entered through.
pub fn pointer_contacts(registry: &Registry, now: Vec2, prev: Vec2) -> Vec<(EntityId, Option<Side>)> {
    let pointer_now = Body::rect(Rect::new(now.x, now.y, 1.0, 1.0));
    let pointer_prev = Body::rect(Rect::new(prev.x, prev.y, 1.0, 1.0));

    registry
        .iter()
        .filter(|e| e.detects_collisions)
        .filter_map(|e| {
            let e_now = e.body();
            if !bodies_collide(&pointer_now, &e_now) {
                return None;
            }
            let e_prev = e.body_at(e.frame_start());
            let was_colliding = bodies_collide(&pointer_prev, &e_prev);
            let side = classify(pointer_prev.bbox, pointer_now.bbox, e_prev.bbox, e_now.bbox, was_colliding);
            Some((e.id(), side))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::CollisionShape;

    fn spawn(reg: &mut Registry, entity: Entity) -> EntityId {
        let id = reg.create(entity, Box::new(()));
        reg.commit_pending();
        id
    }

    fn boxed(x: f32, y: f32) -> Entity {
        Entity::new(Vec2::new(x, y)).with_bbox(0.0, 0.0, 10.0, 10.0)
    }

    /// Simulate a frame's movement: record frame start, then move.
    fn move_to(reg: &mut Registry, id: EntityId, pos: Vec2) {
        let e = reg.get_mut(id).unwrap();
        e.begin_frame();
        e.pos = pos;
    }

    #[test]
    fn query_is_symmetric_and_skips_self() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, boxed(0.0, 0.0));
        let b = spawn(&mut reg, boxed(5.0, 5.0));
        let c = spawn(&mut reg, boxed(50.0, 50.0));

        assert_eq!(collisions(&reg, a, &Filter::All, None), vec![b]);
        assert_eq!(collisions(&reg, b, &Filter::All, None), vec![a]);
        assert!(collisions(&reg, c, &Filter::All, None).is_empty());
        assert!(!collides(&reg, a, a, None));
    }

    #[test]
    fn query_position_override_does_not_move() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, boxed(0.0, 0.0));
        let c = spawn(&mut reg, boxed(50.0, 50.0));
        assert!(collides(&reg, a, c, Some(Vec2::new(45.0, 45.0))));
        assert_eq!(reg.get(a).unwrap().pos, Vec2::ZERO);
        assert!(!collides(&reg, a, c, None));
    }

    #[test]
    fn filters_by_tag_and_ids() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, boxed(0.0, 0.0));
        let wall = spawn(&mut reg, boxed(2.0, 0.0).with_tag("wall"));
        let coin = spawn(&mut reg, boxed(4.0, 0.0).with_tag("coin"));

        assert_eq!(collisions(&reg, a, &Filter::from("wall"), None), vec![wall]);
        assert_eq!(collisions(&reg, a, &Filter::from(coin), None), vec![coin]);
        let ids: HashSet<_> = [wall, coin].into_iter().collect();
        assert_eq!(collisions(&reg, a, &Filter::Ids(ids), None), vec![wall, coin]);
    }

    #[test]
    fn disabled_detection_and_missing_entities_never_collide() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, boxed(0.0, 0.0));
        let ghost = spawn(&mut reg, boxed(0.0, 0.0).with_collisions(false));
        assert!(!collides(&reg, a, ghost, None));
        assert!(collisions(&reg, ghost, &Filter::All, None).is_empty());
        assert!(collisions(&reg, EntityId(404), &Filter::All, None).is_empty());
        assert!(!collides(&reg, a, EntityId(404), None));
    }

    #[test]
    fn new_overlap_on_x_is_directional() {
        let mut reg = Registry::new();
        let mover = spawn(&mut reg, boxed(0.0, 0.0));
        let wall = spawn(&mut reg, boxed(20.0, 0.0));

        move_to(&mut reg, mover, Vec2::new(12.0, 0.0));
        reg.get_mut(wall).unwrap().begin_frame();

        let contacts = detect_contacts(&reg);
        assert_eq!(
            contacts,
            vec![
                Contact { entity: mover, other: wall, side: Some(Side::Right) },
                Contact { entity: wall, other: mover, side: Some(Side::Left) },
            ]
        );
    }

    #[test]
    fn continuing_overlap_is_generic() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, boxed(0.0, 0.0));
        let b = spawn(&mut reg, boxed(5.0, 0.0));
        move_to(&mut reg, a, Vec2::new(1.0, 0.0));
        reg.get_mut(b).unwrap().begin_frame();

        let contacts = detect_contacts(&reg);
        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().all(|c| c.side.is_none()));
    }

    #[test]
    fn falling_onto_floor_hits_top_and_bottom() {
        let mut reg = Registry::new();
        let floor = spawn(&mut reg, Entity::new(Vec2::new(0.0, 100.0)).with_bbox(0.0, 0.0, 200.0, 10.0));
        let rock = spawn(&mut reg, boxed(50.0, 85.0));
        reg.get_mut(floor).unwrap().begin_frame();
        move_to(&mut reg, rock, Vec2::new(50.0, 95.0));

        let contacts = detect_contacts(&reg);
        assert!(contacts.contains(&Contact { entity: floor, other: rock, side: Some(Side::Top) }));
        assert!(contacts.contains(&Contact { entity: rock, other: floor, side: Some(Side::Bottom) }));
    }

    #[test]
    fn diagonal_entry_uses_last_axis_to_close() {
        // b starts up-left of a; the x gap (1) closes before the y gap (5).
        let a = Rect::new(10.0, 10.0, 10.0, 10.0);
        let b_prev = Rect::new(-1.0, -5.0, 10.0, 10.0);
        let b_now = b_prev.translate(Vec2::new(6.0, 6.0));
        assert_eq!(classify(a, a, b_prev, b_now, false), Some(Side::Top));
        // Perfect corner entry is ambiguous.
        let b_prev = Rect::new(-2.0, -2.0, 10.0, 10.0);
        let b_now = b_prev.translate(Vec2::new(4.0, 4.0));
        assert_eq!(classify(a, a, b_prev, b_now, false), None);
    }

    #[test]
    fn inactive_entities_still_collide() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, boxed(0.0, 0.0));
        let b = spawn(
            &mut reg,
            boxed(5.0, 0.0).with_activity(crate::api::types::Activity::Inactive),
        );
        assert!(collides(&reg, a, b, None));
        assert_eq!(detect_contacts(&reg).len(), 2);
    }

    #[test]
    fn contact_pass_agrees_with_queries() {
        let mut reg = Registry::new();
        let mut ids = Vec::new();
        for i in 0..12 {
            let shape = match i % 3 {
                0 => CollisionShape::Rectangle,
                1 => CollisionShape::Ellipse,
                _ => CollisionShape::Precise,
            };
            let x = (i * 7 % 40) as f32;
            let y = (i * 13 % 30) as f32;
            ids.push(spawn(&mut reg, boxed(x, y).with_shape(shape)));
        }

        let contacts = detect_contacts(&reg);
        for &a in &ids {
            let mut from_pass: Vec<_> = contacts
                .iter()
                .filter(|c| c.entity == a)
                .map(|c| c.other)
                .collect();
            from_pass.sort();
            let mut from_query = collisions(&reg, a, &Filter::All, None);
            from_query.sort();
            assert_eq!(from_pass, from_query, "mismatch for {a}");
        }
    }

    #[test]
    fn nan_position_is_left_out_of_the_contact_pass() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, boxed(0.0, 0.0));
        let b = spawn(&mut reg, boxed(5.0, 0.0));
        let lost = spawn(&mut reg, boxed(f32::NAN, 0.0));

        let pairs: Vec<_> = detect_contacts(&reg).iter().map(|c| (c.entity, c.other)).collect();
        assert_eq!(pairs, vec![(a, b), (b, a)]);
        assert!(collisions(&reg, lost, &Filter::All, None).is_empty());
        assert!(!collides(&reg, a, lost, None));
    }

    #[test]
    fn pointer_enters_from_the_right() {
        let mut reg = Registry::new();
        let button = spawn(&mut reg, boxed(0.0, 0.0));
        reg.get_mut(button).unwrap().begin_frame();
        let hits = pointer_contacts(&reg, Vec2::new(5.0, 5.0), Vec2::new(20.0, 5.0));
        // The button entered through the pointer's left side.
        assert_eq!(hits, vec![(button, Some(Side::Left))]);
        assert!(pointer_contacts(&reg, Vec2::new(30.0, 5.0), Vec2::new(20.0, 5.0)).is_empty());
    }
}
