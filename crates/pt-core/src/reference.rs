//! Lazy, identifier-based references between entities.
//!
//! A reference never owns its target. It is built from an identifier token
//! without consulting any directory, so entity graphs with cycles (areas and
//! their exits pointing at each other) load in any order. Resolution happens
//! on demand and treats a vanished target as an ordinary error.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{OnceLock, RwLock, Weak};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::directory::ObjectDirectory;
use crate::entity::{Entity, EntityHandle, EntityId};
use crate::error::{PtError, PtResult};

/// A reference to an entity, or to nothing.
///
/// Equality and hashing consider the identifier only, never whether the
/// reference has been resolved.
#[derive(Clone, Default)]
pub struct EntityRef {
    id: Option<EntityId>,
    cached: OnceLock<Weak<RwLock<Entity>>>,
}

impl EntityRef {
    /// A reference to nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// An unresolved reference to `id`.
    pub fn to(id: EntityId) -> Self {
        Self {
            id: Some(id),
            cached: OnceLock::new(),
        }
    }

    /// A reference already resolved to `handle`.
    pub fn from_handle(handle: &EntityHandle) -> Self {
        let cached = OnceLock::new();
        let _ = cached.set(handle.downgrade());
        Self {
            id: Some(handle.id()),
            cached,
        }
    }

    /// Parse a token. Empty text is a reference to nothing.
    ///
    /// The identifier is not checked against any directory.
    pub fn parse(text: &str) -> PtResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::none());
        }
        text.parse().map(Self::to)
    }

    /// The target identifier, if any.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// Whether this references nothing.
    pub fn is_none(&self) -> bool {
        self.id.is_none()
    }

    /// The token form; empty for a reference to nothing.
    pub fn to_text(&self) -> String {
        self.id.map(|id| id.to_string()).unwrap_or_default()
    }

    /// Whether a live target has been cached.
    pub fn is_resolved(&self) -> bool {
        self.cached.get().is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Resolve through the process-wide directory.
    pub fn resolve(&self) -> PtResult<Option<EntityHandle>> {
        self.resolve_in(&ObjectDirectory::global())
    }

    /// Resolve through `directory`.
    ///
    /// Returns `Ok(None)` for a reference to nothing and
    /// [`PtError::ReferenceNotFound`] when no live entity holds the
    /// identifier. A successful lookup is cached; since identifiers are never
    /// reused, a cached target that has since been destroyed stays gone.
    pub fn resolve_in(&self, directory: &ObjectDirectory) -> PtResult<Option<EntityHandle>> {
        let Some(id) = self.id else {
            return Ok(None);
        };
        if let Some(inner) = self.cached.get().and_then(Weak::upgrade) {
            return Ok(Some(EntityHandle::from_arc(inner)));
        }
        match directory.lookup(id) {
            Some(handle) => {
                let _ = self.cached.set(handle.downgrade());
                Ok(Some(handle))
            }
            None => {
                debug!(%id, "reference did not resolve");
                Err(PtError::ReferenceNotFound(id.to_string()))
            }
        }
    }
}

/// Parse a whitespace-separated token list and resolve every entry.
///
/// All-or-nothing: the first token that fails to parse or resolve fails the
/// whole list. Empty input is an empty list.
pub fn parse_ref_list(text: &str, directory: &ObjectDirectory) -> PtResult<Vec<EntityRef>> {
    text.split_whitespace()
        .map(|token| {
            let reference = EntityRef::parse(token)?;
            reference.resolve_in(directory)?;
            Ok(reference)
        })
        .collect()
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "EntityRef({id})"),
            None => f.write_str("EntityRef(none)"),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for EntityRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for EntityRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::parse(&token).map_err(serde::de::Error::custom)
    }
}
