use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use chrono::{DateTime, Utc};

use crate::directory::ObjectDirectory;
use crate::error::{PtError, PtResult};
use crate::store::PropertyStore;
use crate::template;

/// The kind of a game object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// A room or place players can stand in.
    Area,
    /// A one-way passage out of an area.
    Exit,
    /// Something that can be looked at, carried or sold.
    Item,
    /// A non-player character.
    Character,
    /// A connected player's character.
    Player,
    /// A playable or non-playable race.
    Race,
    /// A character class.
    Class,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 7] = [
        Self::Area,
        Self::Exit,
        Self::Item,
        Self::Character,
        Self::Player,
        Self::Race,
        Self::Class,
    ];

    /// Parse a kind from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "area" => Some(Self::Area),
            "exit" => Some(Self::Exit),
            "item" => Some(Self::Item),
            "character" => Some(Self::Character),
            "player" => Some(Self::Player),
            "race" => Some(Self::Race),
            "class" => Some(Self::Class),
            _ => None,
        }
    }

    /// The lowercase name used in identifier tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Exit => "exit",
            Self::Item => "item",
            Self::Character => "character",
            Self::Player => "player",
            Self::Race => "race",
            Self::Class => "class",
        }
    }

    /// Whether objects of this kind have singular/plural display forms.
    pub fn is_item_like(&self) -> bool {
        matches!(self, Self::Item | Self::Character | Self::Player)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of an entity. Its token form is `<kind>:<number>`.
///
/// Numbers are unique within one [`ObjectDirectory`] regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    /// The entity's kind.
    pub kind: EntityKind,
    /// Directory-unique number.
    pub number: u32,
}

impl EntityId {
    /// Create an identifier.
    pub fn new(kind: EntityKind, number: u32) -> Self {
        Self { kind, number }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.number)
    }
}

impl FromStr for EntityId {
    type Err = PtError;

    fn from_str(s: &str) -> PtResult<Self> {
        let (kind, number) = s
            .split_once(':')
            .ok_or_else(|| PtError::decode("reference", s, "expected <kind>:<number>"))?;
        let kind = EntityKind::parse(kind)
            .ok_or_else(|| PtError::decode("reference", s, format!("unknown kind {kind:?}")))?;
        let number = number
            .parse()
            .map_err(|_| PtError::decode("reference", s, "identifier number is not a number"))?;
        Ok(Self { kind, number })
    }
}

/// A game object: an identifier plus its typed properties.
///
/// An entity registered in an [`ObjectDirectory`] unregisters itself when
/// dropped. Copies made with [`EntityHandle::duplicate`] are never registered.
#[derive(Debug)]
pub struct Entity {
    /// The entity's identifier.
    pub id: EntityId,
    properties: PropertyStore,
    copy: bool,
    modified: bool,
    /// When the entity was constructed.
    pub created_at: DateTime<Utc>,
    /// When the entity was last marked modified.
    pub updated_at: DateTime<Utc>,
    directory: Weak<ObjectDirectory>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, directory: Weak<ObjectDirectory>) -> Self {
        let now = Utc::now();
        Self {
            id,
            properties: template::for_kind(id.kind),
            copy: false,
            modified: false,
            created_at: now,
            updated_at: now,
            directory,
        }
    }

    /// The entity's properties.
    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Mutable access to the properties, bypassing the editor's validation.
    ///
    /// For trusted callers only: construction, loading and game rules that
    /// already know each property's kind.
    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.properties
    }

    /// The entity's display name, or an empty string.
    pub fn name(&self) -> &str {
        self.properties
            .get("name")
            .and_then(|v| v.as_text())
            .unwrap_or_default()
    }

    /// Whether this is a disposable copy.
    pub fn is_copy(&self) -> bool {
        self.copy
    }

    /// Flag the entity as needing to be persisted.
    pub fn set_modified(&mut self) {
        self.modified = true;
        self.updated_at = Utc::now();
    }

    /// Whether the entity changed since it was last persisted.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the modified flag after persisting.
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    /// Singular and plural forms, for kinds that have them.
    pub fn display_forms(&self) -> Option<DisplayForms> {
        if !self.id.kind.is_item_like() {
            return None;
        }
        let text = |name: &str| {
            self.properties
                .get(name)
                .and_then(|v| v.as_text())
                .unwrap_or_default()
                .to_string()
        };
        let name = self.name().to_string();
        let plural = match text("plural") {
            p if p.is_empty() => format!("{name}s"),
            p => p,
        };
        Some(DisplayForms {
            article: text("indefiniteArticle"),
            name,
            plural,
        })
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        if self.copy {
            return;
        }
        if let Some(directory) = self.directory.upgrade() {
            directory.unregister(self.id);
        }
    }
}

/// How an item-like entity reads in running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayForms {
    /// Singular name.
    pub name: String,
    /// Plural name.
    pub plural: String,
    /// Indefinite article, possibly empty.
    pub article: String,
}

impl fmt::Display for DisplayForms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "one {}, two {}, ", self.name, self.plural)?;
        if self.article.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.article, self.name)
        }
    }
}

/// Shared handle to a live entity.
///
/// The world is updated by one logical actor per entity at a time, so the
/// lock is never contended for long; a poisoned lock is recovered rather
/// than propagated.
#[derive(Clone)]
pub struct EntityHandle(Arc<RwLock<Entity>>);

impl EntityHandle {
    pub(crate) fn from_entity(entity: Entity) -> Self {
        Self(Arc::new(RwLock::new(entity)))
    }

    pub(crate) fn from_arc(inner: Arc<RwLock<Entity>>) -> Self {
        Self(inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<RwLock<Entity>> {
        Arc::downgrade(&self.0)
    }

    /// Lock the entity for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Entity> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the entity for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Entity> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The entity's identifier.
    pub fn id(&self) -> EntityId {
        self.read().id
    }

    /// Whether two handles point at the same entity instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A detached copy with the same identifier and properties.
    ///
    /// The copy is not registered and its drop leaves the directory alone.
    pub fn duplicate(&self) -> Self {
        let source = self.read();
        Self::from_entity(Entity {
            id: source.id,
            properties: source.properties.clone(),
            copy: true,
            modified: false,
            created_at: source.created_at,
            updated_at: source.updated_at,
            directory: Weak::new(),
        })
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityHandle").field(&self.id()).finish()
    }
}
