//! WireText persistence for entities and whole realms.
//!
//! An entity is stored as `{"id": "<token>", "properties": {...}}` where each
//! property holds its value's wire fragment. Loading decodes every fragment
//! against the kind the entity's template gives that property.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use tracing::warn;

use crate::directory::ObjectDirectory;
use crate::entity::{Entity, EntityHandle, EntityId};
use crate::error::{PtError, PtResult};
use crate::registry::TypeRegistry;
use crate::template;

/// Version written into realm documents.
pub const WIRE_VERSION: u32 = 1;

/// The persisted form of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Identifier token.
    pub id: String,
    /// Property name to wire fragment.
    #[serde(default)]
    pub properties: Map<String, Json>,
}

/// The persisted form of a realm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealmDocument {
    /// Format version.
    pub version: u32,
    /// Every entity, in identifier order.
    pub entities: Vec<EntityDocument>,
}

/// Encode an entity's properties as wire fragments.
pub fn entity_to_wire(entity: &Entity, registry: &TypeRegistry) -> PtResult<EntityDocument> {
    let mut properties = Map::new();
    for (name, value) in entity.properties().iter() {
        let fragment = registry.to_wire_text(value)?;
        properties.insert(name.to_string(), serde_json::from_str(&fragment)?);
    }
    Ok(EntityDocument {
        id: entity.id.to_string(),
        properties,
    })
}

/// Decode a document and register the entity in `directory`.
///
/// All fragments are decoded before anything is registered, so a bad
/// document leaves the directory untouched. Properties the kind's template
/// does not define are skipped with a warning. References are left
/// unresolved.
pub fn entity_from_wire(
    document: &EntityDocument,
    directory: &Arc<ObjectDirectory>,
    registry: &TypeRegistry,
) -> PtResult<EntityHandle> {
    let id: EntityId = document.id.parse()?;
    let template = template::for_kind(id.kind);

    let mut decoded = Vec::with_capacity(document.properties.len());
    for (name, fragment) in &document.properties {
        let Some(kind) = template.kind_of(name) else {
            warn!(%id, property = %name, "skipping property unknown to this kind");
            continue;
        };
        decoded.push((name.clone(), registry.from_wire_text(&kind, &fragment.to_string())?));
    }

    let handle = directory.spawn_with_id(id)?;
    {
        let mut entity = handle.write();
        for (name, value) in decoded {
            entity.properties_mut().insert_unchecked(name, value);
        }
    }
    Ok(handle)
}

/// Parse a realm document, checking its version.
pub fn parse_realm(text: &str) -> PtResult<RealmDocument> {
    let document: RealmDocument = serde_json::from_str(text)?;
    if document.version > WIRE_VERSION {
        return Err(PtError::decode(
            "realm",
            &document.version.to_string(),
            format!("version {} is newer than {WIRE_VERSION}", document.version),
        ));
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::GENDER;
    use crate::entity::EntityKind;
    use crate::reference::EntityRef;
    use crate::value::Value;

    fn registry() -> TypeRegistry {
        TypeRegistry::with_builtins().unwrap()
    }

    #[test]
    fn entity_round_trips_through_a_fresh_directory() {
        let registry = registry();
        let source = ObjectDirectory::new();
        let exit = source.spawn(EntityKind::Exit);
        {
            let mut e = exit.write();
            let props = e.properties_mut();
            props.insert_unchecked("name", Value::Text("north".into()));
            props.insert_unchecked("hidden", Value::Boolean(true));
            props.insert_unchecked(
                "destinationArea",
                Value::Ref(EntityRef::to(EntityId::new(EntityKind::Area, 9))),
            );
        }
        let document = entity_to_wire(&exit.read(), &registry).unwrap();
        assert_eq!(document.properties["destinationArea"], Json::from("area:9"));

        let target = ObjectDirectory::new();
        let loaded = entity_from_wire(&document, &target, &registry).unwrap();
        assert_eq!(loaded.id(), exit.id());
        assert_eq!(loaded.read().properties(), exit.read().properties());
        assert!(!loaded.read().is_modified());
    }

    #[test]
    fn unknown_properties_are_skipped() {
        let registry = registry();
        let document: EntityDocument =
            serde_json::from_str(r#"{"id":"item:3","properties":{"name":"cup","colour":"red"}}"#)
                .unwrap();
        let directory = ObjectDirectory::new();
        let loaded = entity_from_wire(&document, &directory, &registry).unwrap();
        assert_eq!(loaded.read().name(), "cup");
        assert!(!loaded.read().properties().contains("colour"));
    }

    #[test]
    fn bad_fragment_registers_nothing() {
        let registry = registry();
        let document: EntityDocument = serde_json::from_str(
            r#"{"id":"character:4","properties":{"name":"Bob","gender":"Robot"}}"#,
        )
        .unwrap();
        let directory = ObjectDirectory::new();
        let err = entity_from_wire(&document, &directory, &registry);
        assert!(matches!(err, Err(PtError::DecodeFailed { kind, .. }) if kind == format!("enum {GENDER}")));
        assert!(directory.is_empty());
    }

    #[test]
    fn newer_versions_are_refused() {
        assert!(parse_realm(r#"{"version":1,"entities":[]}"#).is_ok());
        assert!(matches!(
            parse_realm(r#"{"version":2,"entities":[]}"#),
            Err(PtError::DecodeFailed { .. })
        ));
        assert!(matches!(parse_realm("[]"), Err(PtError::Wire(_))));
    }
}
