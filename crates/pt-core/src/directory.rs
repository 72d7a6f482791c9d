use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock, Weak};

use tracing::debug;

use crate::entity::{Entity, EntityHandle, EntityId, EntityKind};
use crate::error::{PtError, PtResult};

struct Slot {
    kind: EntityKind,
    entity: Weak<RwLock<Entity>>,
}

static GLOBAL: LazyLock<Arc<ObjectDirectory>> = LazyLock::new(ObjectDirectory::new);

/// Maps identifiers to live entities without owning them.
///
/// Entities register here when spawned and unregister when dropped.
/// Identifier numbers come from a counter that only moves forward, and the
/// numbers of destroyed entities are retired, so a number never names two
/// different entities in the same directory.
pub struct ObjectDirectory {
    slots: RwLock<HashMap<u32, Slot>>,
    retired: RwLock<HashSet<u32>>,
    next_number: AtomicU32,
}

impl ObjectDirectory {
    /// Create an empty directory.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slots: RwLock::new(HashMap::new()),
            retired: RwLock::new(HashSet::new()),
            next_number: AtomicU32::new(1),
        })
    }

    /// The process-wide directory.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Construct and register a new entity of `kind` with a fresh identifier.
    pub fn spawn(self: &Arc<Self>, kind: EntityKind) -> EntityHandle {
        let number = self.next_number.fetch_add(1, Ordering::Relaxed);
        let id = EntityId::new(kind, number);
        let handle = EntityHandle::from_entity(Entity::new(id, Arc::downgrade(self)));
        self.write_slots().insert(
            number,
            Slot {
                kind,
                entity: handle.downgrade(),
            },
        );
        debug!(%id, "spawned entity");
        handle
    }

    /// Construct and register an entity under a known identifier, as when
    /// loading from storage.
    ///
    /// Fails with [`PtError::DuplicateId`] if the number is registered or
    /// belonged to an entity that has since been destroyed. Fresh numbers
    /// handed out afterwards are above `id`.
    pub fn spawn_with_id(self: &Arc<Self>, id: EntityId) -> PtResult<EntityHandle> {
        let mut slots = self.write_slots();
        if slots.contains_key(&id.number) || self.is_retired(id.number) {
            return Err(PtError::DuplicateId(id));
        }
        let handle = EntityHandle::from_entity(Entity::new(id, Arc::downgrade(self)));
        slots.insert(
            id.number,
            Slot {
                kind: id.kind,
                entity: handle.downgrade(),
            },
        );
        drop(slots);
        self.next_number
            .fetch_max(id.number.saturating_add(1), Ordering::Relaxed);
        debug!(%id, "loaded entity");
        Ok(handle)
    }

    /// Find the live entity holding `id`.
    pub fn lookup(&self, id: EntityId) -> Option<EntityHandle> {
        let weak = {
            let slots = self.read_slots();
            let slot = slots.get(&id.number)?;
            if slot.kind != id.kind {
                return None;
            }
            slot.entity.clone()
        };
        weak.upgrade().map(EntityHandle::from_arc)
    }

    /// Whether a live entity holds `id`.
    pub fn contains(&self, id: EntityId) -> bool {
        self.read_slots()
            .get(&id.number)
            .is_some_and(|slot| slot.kind == id.kind && slot.entity.strong_count() > 0)
    }

    /// Every live entity, in identifier-number order.
    pub fn live(&self) -> Vec<EntityHandle> {
        let mut weaks: Vec<(u32, Weak<RwLock<Entity>>)> = self
            .read_slots()
            .iter()
            .map(|(number, slot)| (*number, slot.entity.clone()))
            .collect();
        weaks.sort_by_key(|(number, _)| *number);
        weaks
            .into_iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .map(EntityHandle::from_arc)
            .collect()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.read_slots()
            .values()
            .filter(|slot| slot.entity.strong_count() > 0)
            .count()
    }

    /// Whether no live entity is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn unregister(&self, id: EntityId) {
        let mut slots = self.write_slots();
        if slots
            .get(&id.number)
            .is_some_and(|slot| slot.entity.strong_count() == 0)
        {
            slots.remove(&id.number);
            self.retired
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id.number);
            debug!(%id, "unregistered entity");
        }
    }

    fn is_retired(&self, number: u32) -> bool {
        self.retired
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&number)
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, HashMap<u32, Slot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slots(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<u32, Slot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ObjectDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDirectory")
            .field("live", &self.len())
            .field("next_number", &self.next_number.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_increasing_numbers() {
        let directory = ObjectDirectory::new();
        let a = directory.spawn(EntityKind::Area);
        let b = directory.spawn(EntityKind::Exit);
        assert!(b.id().number > a.id().number);
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn dropping_the_last_handle_unregisters() {
        let directory = ObjectDirectory::new();
        let item = directory.spawn(EntityKind::Item);
        let id = item.id();
        let second = item.clone();
        drop(item);
        assert!(directory.contains(id));
        drop(second);
        assert!(!directory.contains(id));
        assert!(directory.lookup(id).is_none());
        assert!(directory.is_empty());
    }

    #[test]
    fn numbers_are_not_reused_after_destruction() {
        let directory = ObjectDirectory::new();
        let first = directory.spawn(EntityKind::Item).id();
        let second = directory.spawn(EntityKind::Item).id();
        assert_ne!(first.number, second.number);
    }

    #[test]
    fn loaded_numbers_push_the_counter_forward() {
        let directory = ObjectDirectory::new();
        let _area = directory
            .spawn_with_id(EntityId::new(EntityKind::Area, 50))
            .unwrap();
        let fresh = directory.spawn(EntityKind::Area);
        assert!(fresh.id().number > 50);
    }

    #[test]
    fn live_identifiers_cannot_be_loaded_twice() {
        let directory = ObjectDirectory::new();
        let id = EntityId::new(EntityKind::Race, 3);
        let _race = directory.spawn_with_id(id).unwrap();
        assert!(matches!(
            directory.spawn_with_id(id),
            Err(PtError::DuplicateId(dup)) if dup == id
        ));
        // Same number under another kind is still the same number.
        assert!(directory
            .spawn_with_id(EntityId::new(EntityKind::Class, 3))
            .is_err());
    }

    #[test]
    fn destroyed_numbers_cannot_be_loaded_again() {
        let directory = ObjectDirectory::new();
        let item = directory.spawn(EntityKind::Item);
        let id = item.id();
        drop(item);
        assert!(!directory.contains(id));
        assert!(matches!(
            directory.spawn_with_id(id),
            Err(PtError::DuplicateId(dup)) if dup == id
        ));
        assert!(directory.lookup(id).is_none());
    }

    #[test]
    fn debug_shows_live_count() {
        let directory = ObjectDirectory::new();
        let _area = directory.spawn(EntityKind::Area);
        assert_eq!(
            format!("{directory:?}"),
            "ObjectDirectory { live: 1, next_number: 2 }"
        );
    }

    #[test]
    fn copies_do_not_touch_the_directory() {
        let directory = ObjectDirectory::new();
        let item = directory.spawn(EntityKind::Item);
        let copy = item.duplicate();
        drop(copy);
        assert!(directory.contains(item.id()));
        assert!(directory.lookup(item.id()).unwrap().ptr_eq(&item));
    }

    #[test]
    fn live_lists_in_number_order() {
        let directory = ObjectDirectory::new();
        let a = directory.spawn(EntityKind::Area);
        let b = directory.spawn(EntityKind::Item);
        let live = directory.live();
        assert_eq!(live.len(), 2);
        assert!(live[0].ptr_eq(&a));
        assert!(live[1].ptr_eq(&b));
    }
}
