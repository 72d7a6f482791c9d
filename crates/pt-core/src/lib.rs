//! Core of the PlainText world: typed properties, the type registry and
//! lazy references between entities.
//!
//! Every game object owns a [`PropertyStore`] of tagged [`Value`]s. The
//! [`TypeRegistry`] holds the text converters for enum, flags and custom
//! kinds, and [`EntityRef`]s point at other objects by identifier through an
//! [`ObjectDirectory`]. The [`PropertyEditor`] ties them together: it turns
//! free text typed by an administrator into a value of whatever kind the
//! target property already holds.

/// Built-in registered types (gender, item flags, character stats).
pub mod builtins;
/// Parsing of the `set-prop` command and object selectors.
pub mod command;
/// Property editor configuration.
pub mod config;
/// The weak identifier-to-entity table.
pub mod directory;
/// The free-text property mutation path.
pub mod editor;
/// Entity kinds, identifiers, entities and shared handles.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Generated enum and flags families.
pub mod family;
/// Property name canonicalization.
pub mod naming;
/// Lazy entity references.
pub mod reference;
/// The owner of a world's entities.
pub mod realm;
/// The type registry and its converters.
pub mod registry;
/// Per-entity typed property storage.
pub mod store;
/// Default properties for each entity kind.
pub mod template;
/// The tagged value model.
pub mod value;
/// WireText persistence of entities and realms.
pub mod wire;

/// Re-export command types.
pub use command::{SET_PROP_USAGE, Selector, SetPropCommand};
/// Re-export configuration types.
pub use config::{EditorConfig, IntegerParsing};
/// Re-export the directory.
pub use directory::ObjectDirectory;
/// Re-export editor types.
pub use editor::{EditOutcome, PropertyEditor};
/// Re-export core entity types.
pub use entity::{DisplayForms, Entity, EntityHandle, EntityId, EntityKind};
/// Re-export error types.
pub use error::{PtError, PtResult};
/// Re-export family types.
pub use family::{EnumFamily, FlagsFamily};
/// Re-export the reference type.
pub use reference::EntityRef;
/// Re-export realm types.
pub use realm::{DanglingRef, Realm};
/// Re-export registry types.
pub use registry::{Converters, TypeRegistry};
/// Re-export the property store.
pub use store::PropertyStore;
/// Re-export value types.
pub use value::{CustomType, CustomValue, EnumValue, FlagsValue, Value, ValueKind};
