use std::collections::{HashMap, HashSet};

use crate::api::behavior::Behavior;
use crate::api::error::{EngineError, EngineResult};
use crate::api::types::{EntityId, Key};
use crate::components::entity::Entity;

struct Slot {
    entity: Entity,
    behavior: Option<Box<dyn Behavior>>,
}

/// Exclusive owner of a room's entities.
///
/// Entities live in a flat Vec in creation order, which is the iteration
/// order of every frame phase. Creation and destruction are queued and
/// only take effect when the scheduler flushes at a frame boundary, so the
/// set being iterated never changes mid-frame.
/// Designed for small-to-medium entity counts (hundreds, not millions).
pub struct Registry {
    live: Vec<Slot>,
    index: HashMap<EntityId, usize>,
    pending: Vec<Slot>,
    doomed: Vec<EntityId>,
    taken: HashSet<EntityId>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a registry with a specific entity capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            live: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            pending: Vec::new(),
            doomed: Vec::new(),
            taken: HashSet::with_capacity(capacity),
            next_id: 1,
        }
    }

    fn fresh_id(&mut self) -> EntityId {
        loop {
            let id = EntityId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1).max(1);
            if !self.taken.contains(&id) {
                return id;
            }
        }
    }

    /// Queue an entity for creation and return its identifier.
    ///
    /// A requested identifier that is already in use is remapped to a
    /// fresh one. The entity joins the live set at the next flush.
    pub fn create(&mut self, entity: Entity, behavior: Box<dyn Behavior>) -> EntityId {
        let id = match entity.requested_id() {
            Some(wanted) if !self.taken.contains(&wanted) => wanted,
            Some(wanted) => {
                let id = self.fresh_id();
                log::debug!("entity id {wanted} is taken, remapped to {id}");
                id
            }
            None => self.fresh_id(),
        };
        self.enqueue(id, entity, behavior);
        id
    }

    /// Like [`create`](Self::create), but fails instead of remapping a
    /// taken identifier.
    pub fn try_create_exact(
        &mut self,
        entity: Entity,
        behavior: Box<dyn Behavior>,
    ) -> EngineResult<EntityId> {
        let id = match entity.requested_id() {
            Some(wanted) if self.taken.contains(&wanted) => {
                return Err(EngineError::DuplicateIdentifier { requested: wanted });
            }
            Some(wanted) => wanted,
            None => self.fresh_id(),
        };
        self.enqueue(id, entity, behavior);
        Ok(id)
    }

    fn enqueue(&mut self, id: EntityId, mut entity: Entity, behavior: Box<dyn Behavior>) {
        entity.assign(id);
        self.taken.insert(id);
        self.pending.push(Slot {
            entity,
            behavior: Some(behavior),
        });
    }

    /// Mark a live or pending entity for destruction at the next flush.
    /// Marking twice is harmless; the destroy notification fires once.
    pub fn destroy(&mut self, id: EntityId) -> EngineResult<()> {
        if !self.taken.contains(&id) {
            return Err(EngineError::entity(id));
        }
        if !self.doomed.contains(&id) {
            self.doomed.push(id);
        }
        Ok(())
    }

    pub fn is_doomed(&self, id: EntityId) -> bool {
        self.doomed.contains(&id)
    }

    /// Whether `id` is assigned to a live or pending entity.
    pub fn is_taken(&self, id: EntityId) -> bool {
        self.taken.contains(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Get a reference to a live entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.live[i].entity)
    }

    /// Get a mutable reference to a live entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.live[i].entity),
            None => None,
        }
    }

    pub fn try_get(&self, id: EntityId) -> EngineResult<&Entity> {
        self.get(id).ok_or_else(|| EngineError::entity(id))
    }

    pub fn try_get_mut(&mut self, id: EntityId) -> EngineResult<&mut Entity> {
        self.get_mut(id).ok_or_else(|| EngineError::entity(id))
    }

    /// Identifiers of all live entities in creation order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.live.iter().map(|s| s.entity.id()).collect()
    }

    /// Iterate over live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.live.iter().map(|s| &s.entity)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.live.iter_mut().map(|s| &mut s.entity)
    }

    /// Find the first live entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.iter().find(|e| e.tag == tag)
    }

    /// Find all live entities with the given tag.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.iter().filter(|e| e.tag == tag).collect()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of entities waiting for the next flush to join.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // -- Alarms --

    pub fn set_alarm(&mut self, id: EntityId, alarm: Key, ticks: Option<f32>) -> EngineResult<()> {
        self.try_get_mut(id)?.alarms.set(alarm, ticks);
        Ok(())
    }

    pub fn get_alarm(&self, id: EntityId, alarm: &Key) -> Option<f32> {
        self.get(id).and_then(|e| e.alarms.get(alarm))
    }

    // -- Scheduler plumbing --

    /// Take an entity's behaviour out for the duration of a notification.
    pub(crate) fn take_behavior(&mut self, id: EntityId) -> Option<Box<dyn Behavior>> {
        let &i = self.index.get(&id)?;
        self.live[i].behavior.take()
    }

    pub(crate) fn restore_behavior(&mut self, id: EntityId, behavior: Box<dyn Behavior>) {
        if let Some(&i) = self.index.get(&id) {
            self.live[i].behavior = Some(behavior);
        }
    }

    /// Move queued creations into the live set. Returns their identifiers
    /// in creation order.
    pub(crate) fn commit_pending(&mut self) -> Vec<EntityId> {
        let pending = std::mem::take(&mut self.pending);
        let mut ids = Vec::with_capacity(pending.len());
        for slot in pending {
            let id = slot.entity.id();
            self.index.insert(id, self.live.len());
            self.live.push(slot);
            ids.push(id);
        }
        ids
    }

    /// Doomed entities that are live, in the order they were doomed.
    /// Doomed entities still pending stay queued until they are committed.
    pub(crate) fn doomed_live(&self) -> Vec<EntityId> {
        self.doomed
            .iter()
            .copied()
            .filter(|id| self.index.contains_key(id))
            .collect()
    }

    /// Drop the given doomed entities from the live set and free their ids.
    pub(crate) fn remove(&mut self, ids: &[EntityId]) {
        if ids.is_empty() {
            return;
        }
        let gone: HashSet<EntityId> = ids.iter().copied().collect();
        self.live.retain(|s| !gone.contains(&s.entity.id()));
        self.doomed.retain(|id| !gone.contains(id));
        for id in &gone {
            self.taken.remove(id);
        }
        self.reindex();
    }

    pub(crate) fn has_pending_work(&self) -> bool {
        !self.pending.is_empty() || !self.doomed.is_empty()
    }

    /// Discard every entity without notifications.
    pub(crate) fn clear(&mut self) {
        self.live.clear();
        self.index.clear();
        self.pending.clear();
        self.doomed.clear();
        self.taken.clear();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, slot) in self.live.iter().enumerate() {
            self.index.insert(slot.entity.id(), i);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn spawn(reg: &mut Registry, entity: Entity) -> EntityId {
        let id = reg.create(entity, Box::new(()));
        reg.commit_pending();
        id
    }

    #[test]
    fn create_is_deferred_until_commit() {
        let mut reg = Registry::new();
        let id = reg.create(Entity::new(Vec2::new(10.0, 20.0)), Box::new(()));
        assert!(reg.get(id).is_none());
        assert_eq!(reg.pending_len(), 1);

        assert_eq!(reg.commit_pending(), vec![id]);
        assert_eq!(reg.get(id).unwrap().pos, Vec2::new(10.0, 20.0));
        assert_eq!(reg.get(id).unwrap().start(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn taken_id_is_remapped() {
        let mut reg = Registry::new();
        let first = spawn(&mut reg, Entity::new(Vec2::ZERO).with_id(EntityId(5)));
        assert_eq!(first, EntityId(5));

        let second = spawn(&mut reg, Entity::new(Vec2::ZERO).with_id(EntityId(5)));
        assert_ne!(second, EntityId(5));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(second).unwrap().id(), second);
    }

    #[test]
    fn pending_ids_count_as_taken() {
        let mut reg = Registry::new();
        let a = reg.create(Entity::new(Vec2::ZERO).with_id(EntityId(9)), Box::new(()));
        let b = reg.create(Entity::new(Vec2::ZERO).with_id(EntityId(9)), Box::new(()));
        assert_eq!(a, EntityId(9));
        assert_ne!(a, b);
    }

    #[test]
    fn exact_creation_reports_duplicates() {
        let mut reg = Registry::new();
        spawn(&mut reg, Entity::new(Vec2::ZERO).with_id(EntityId(2)));
        let err = reg
            .try_create_exact(Entity::new(Vec2::ZERO).with_id(EntityId(2)), Box::new(()))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateIdentifier { requested } if requested == EntityId(2)));
    }

    #[test]
    fn fresh_ids_skip_requested_ones() {
        let mut reg = Registry::new();
        spawn(&mut reg, Entity::new(Vec2::ZERO).with_id(EntityId(1)));
        let next = spawn(&mut reg, Entity::new(Vec2::ZERO));
        assert_eq!(next, EntityId(2));
    }

    #[test]
    fn destroy_is_deferred_and_frees_id() {
        let mut reg = Registry::new();
        let a = spawn(&mut reg, Entity::new(Vec2::ZERO));
        let b = spawn(&mut reg, Entity::new(Vec2::ZERO));

        reg.destroy(a).unwrap();
        reg.destroy(a).unwrap();
        assert!(reg.contains(a));
        assert_eq!(reg.doomed_live(), vec![a]);

        reg.remove(&[a]);
        assert!(!reg.contains(a));
        assert!(!reg.is_taken(a));
        assert_eq!(reg.ids(), vec![b]);
        assert_eq!(reg.get(b).unwrap().id(), b);

        // Freed ids come back only on request.
        let again = spawn(&mut reg, Entity::new(Vec2::ZERO).with_id(a));
        assert_eq!(again, a);
    }

    #[test]
    fn destroy_unknown_is_invalid_reference() {
        let mut reg = Registry::new();
        assert!(matches!(
            reg.destroy(EntityId(42)),
            Err(EngineError::InvalidReference { .. })
        ));
    }

    #[test]
    fn creation_order_is_preserved() {
        let mut reg = Registry::new();
        let ids: Vec<_> = (0..5)
            .map(|i| spawn(&mut reg, Entity::new(Vec2::splat(i as f32))))
            .collect();
        assert_eq!(reg.ids(), ids);
        reg.remove(&[ids[2]]);
        assert_eq!(reg.ids(), vec![ids[0], ids[1], ids[3], ids[4]]);
    }

    #[test]
    fn alarms_through_registry() {
        let mut reg = Registry::new();
        let id = spawn(&mut reg, Entity::new(Vec2::ZERO));
        reg.set_alarm(id, Key::from("t"), Some(4.0)).unwrap();
        assert_eq!(reg.get_alarm(id, &Key::from("t")), Some(4.0));
        assert!(reg.set_alarm(EntityId(99), Key::from("t"), Some(1.0)).is_err());
        assert_eq!(reg.get_alarm(EntityId(99), &Key::from("t")), None);
    }

    #[test]
    fn find_by_tag() {
        let mut reg = Registry::new();
        let hero = spawn(&mut reg, Entity::new(Vec2::ZERO).with_tag("hero"));
        spawn(&mut reg, Entity::new(Vec2::ZERO).with_tag("enemy"));
        spawn(&mut reg, Entity::new(Vec2::ZERO).with_tag("enemy"));
        assert_eq!(reg.find_by_tag("hero").unwrap().id(), hero);
        assert_eq!(reg.find_all_by_tag("enemy").len(), 2);
    }
}
