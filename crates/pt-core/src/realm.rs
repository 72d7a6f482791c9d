use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::directory::ObjectDirectory;
use crate::entity::{EntityHandle, EntityId, EntityKind};
use crate::error::{PtError, PtResult};
use crate::registry::TypeRegistry;
use crate::wire::{self, RealmDocument, WIRE_VERSION};

/// Area properties listing what can be found in the area.
const AREA_CONTENTS: [&str; 4] = ["exits", "items", "npcs", "players"];

/// A reference that points at no live entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    /// The entity holding the reference.
    pub from: EntityId,
    /// The property holding it.
    pub property: String,
    /// The unresolvable token.
    pub target: String,
}

/// Owns the entities of one game world.
///
/// The directory only holds weak references; entities live as long as the
/// realm (or some other holder) keeps their handle.
#[derive(Debug)]
pub struct Realm {
    directory: Arc<ObjectDirectory>,
    entities: BTreeMap<EntityId, EntityHandle>,
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl Realm {
    /// An empty realm with its own directory.
    pub fn new() -> Self {
        Self::with_directory(ObjectDirectory::new())
    }

    /// An empty realm registering into `directory`.
    pub fn with_directory(directory: Arc<ObjectDirectory>) -> Self {
        Self {
            directory,
            entities: BTreeMap::new(),
        }
    }

    /// The directory entities are registered in.
    pub fn directory(&self) -> &Arc<ObjectDirectory> {
        &self.directory
    }

    // -----------------------------------------------------------------------
    // Entity lifecycle
    // -----------------------------------------------------------------------

    /// Create a new entity of `kind` from its template.
    pub fn create(&mut self, kind: EntityKind) -> EntityHandle {
        let handle = self.directory.spawn(kind);
        self.entities.insert(handle.id(), handle.clone());
        handle
    }

    /// Create an entity under a known identifier.
    pub fn create_with_id(&mut self, id: EntityId) -> PtResult<EntityHandle> {
        let handle = self.directory.spawn_with_id(id)?;
        self.entities.insert(id, handle.clone());
        Ok(handle)
    }

    /// Release the realm's handle on an entity.
    ///
    /// The entity is destroyed, and unregistered, once the returned handle
    /// and any other clones are dropped.
    pub fn remove(&mut self, id: EntityId) -> PtResult<EntityHandle> {
        self.entities
            .remove(&id)
            .ok_or(PtError::EntityNotFound(id))
    }

    /// Get an entity by identifier.
    pub fn get(&self, id: EntityId) -> Option<&EntityHandle> {
        self.entities.get(&id)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All entities, in identifier order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityHandle> {
        self.entities.values()
    }

    /// All entities of one kind.
    pub fn entities_by_kind(&self, kind: EntityKind) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|(id, _)| id.kind == kind)
            .map(|(_, handle)| handle.clone())
            .collect()
    }

    /// Entities whose name matches `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Vec<EntityHandle> {
        let needle = name.to_lowercase();
        self.entities
            .values()
            .filter(|handle| handle.read().name().to_lowercase() == needle)
            .cloned()
            .collect()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities changed since they were last persisted.
    pub fn modified(&self) -> Vec<EntityHandle> {
        self.entities
            .values()
            .filter(|handle| handle.read().is_modified())
            .cloned()
            .collect()
    }

    /// Mark every entity as persisted.
    pub fn clear_modified(&self) {
        for handle in self.entities.values() {
            handle.write().clear_modified();
        }
    }

    /// An area and everything it lists: its exits, items, npcs and players.
    ///
    /// This is the set of objects a command issued inside the area can
    /// select. Entries that no longer resolve are left out.
    pub fn area_scope(&self, area: EntityId) -> PtResult<Vec<EntityHandle>> {
        if area.kind != EntityKind::Area {
            return Err(PtError::UnexpectedKind {
                expected: EntityKind::Area.to_string(),
                found: area.kind.to_string(),
            });
        }
        let handle = self.get(area).ok_or(PtError::EntityNotFound(area))?;
        let mut scope = vec![handle.clone()];

        let refs: Vec<_> = {
            let entity = handle.read();
            AREA_CONTENTS
                .iter()
                .filter_map(|name| entity.properties().get(name))
                .flat_map(|value| value.refs().to_vec())
                .collect()
        };
        for reference in refs {
            match reference.resolve_in(&self.directory) {
                Ok(Some(member)) => scope.push(member),
                Ok(None) => {}
                Err(e) => warn!(%area, error = %e, "area lists a missing object"),
            }
        }
        Ok(scope)
    }

    /// Every reference, in every entity, that does not resolve.
    pub fn dangling_references(&self) -> Vec<DanglingRef> {
        let mut dangling = Vec::new();
        for handle in self.entities.values() {
            let entity = handle.read();
            for (property, value) in entity.properties().iter() {
                for reference in value.refs() {
                    if reference.resolve_in(&self.directory).is_err() {
                        dangling.push(DanglingRef {
                            from: entity.id,
                            property: property.to_string(),
                            target: reference.to_text(),
                        });
                    }
                }
            }
        }
        dangling
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load a realm document, registering every entity in `directory`.
    ///
    /// Entities may reference each other in any order. If any entity fails to
    /// load, the ones loaded before it are released again.
    pub fn from_wire(
        text: &str,
        directory: Arc<ObjectDirectory>,
        registry: &TypeRegistry,
    ) -> PtResult<Self> {
        let document = wire::parse_realm(text)?;
        let mut realm = Self::with_directory(directory);
        for entity in &document.entities {
            let handle = wire::entity_from_wire(entity, &realm.directory, registry)?;
            realm.entities.insert(handle.id(), handle);
        }
        Ok(realm)
    }

    /// Encode the realm as a pretty-printed document.
    pub fn to_wire(&self, registry: &TypeRegistry) -> PtResult<String> {
        let entities = self
            .entities
            .values()
            .map(|handle| wire::entity_to_wire(&handle.read(), registry))
            .collect::<PtResult<Vec<_>>>()?;
        let document = RealmDocument {
            version: WIRE_VERSION,
            entities,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
