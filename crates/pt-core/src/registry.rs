//! The type registry: text converters for every registered value kind.
//!
//! Built-in kinds (booleans, integers, text, references, text lists) are
//! encoded directly. Enum, flags and custom kinds are looked up by type name.
//! The process-wide registry is built once, before any lookups, and is
//! read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::builtins;
use crate::error::{PtError, PtResult};
use crate::family::{EnumFamily, FlagsFamily};
use crate::reference::EntityRef;
use crate::value::{CustomType, CustomValue, Value, ValueKind};

type EncodeFn = dyn Fn(&Value) -> PtResult<String> + Send + Sync;
type DecodeFn = dyn Fn(&str) -> PtResult<Value> + Send + Sync;

/// An encode/decode pair for one text encoding of one type.
#[derive(Clone)]
pub struct Converters {
    encode: Arc<EncodeFn>,
    decode: Arc<DecodeFn>,
}

impl Converters {
    /// Build a pair from two closures.
    pub fn new(
        encode: impl Fn(&Value) -> PtResult<String> + Send + Sync + 'static,
        decode: impl Fn(&str) -> PtResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    /// Build a pair for a [`CustomType`] from converters over `T` itself.
    pub fn for_custom<T: CustomType>(
        encode: impl Fn(&T) -> PtResult<String> + Send + Sync + 'static,
        decode: impl Fn(&str) -> PtResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            move |value| match value {
                Value::Other(custom) => match custom.downcast_ref::<T>() {
                    Some(inner) => encode(inner),
                    None => Err(unexpected(T::TYPE_NAME, value)),
                },
                _ => Err(unexpected(T::TYPE_NAME, value)),
            },
            move |text| decode(text).map(|inner| Value::Other(CustomValue::new(inner))),
        )
    }

    /// Encode a value as text.
    pub fn encode(&self, value: &Value) -> PtResult<String> {
        (self.encode)(value)
    }

    /// Decode text into a value.
    pub fn decode(&self, text: &str) -> PtResult<Value> {
        (self.decode)(text)
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converters")
    }
}

fn unexpected(expected: &str, value: &Value) -> PtError {
    PtError::UnexpectedKind {
        expected: expected.to_string(),
        found: value.kind().to_string(),
    }
}

/// What produced a registry entry.
#[derive(Debug, Clone)]
pub enum TypeFamily {
    /// A generated enum family.
    Enum(Arc<EnumFamily>),
    /// A generated flags family.
    Flags(Arc<FlagsFamily>),
    /// Hand-written converters for a custom type.
    Custom,
}

/// One registered type.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    /// The registered type name.
    pub name: String,
    /// How the type's values are formed.
    pub family: TypeFamily,
    /// Human-facing converters.
    pub user: Converters,
    /// Persistence converters.
    pub wire: Converters,
}

/// Maps type names to their UserText and WireText converters.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in game types.
    pub fn with_builtins() -> PtResult<Self> {
        let mut registry = Self::new();
        builtins::register(&mut registry)?;
        Ok(registry)
    }

    fn insert(&mut self, entry: TypeEntry) -> PtResult<()> {
        if self.entries.contains_key(&entry.name) {
            return Err(PtError::DuplicateType(entry.name));
        }
        debug!(type_name = %entry.name, "registered type");
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Register a custom type under `name`. Fails if the name is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        user: Converters,
        wire: Converters,
    ) -> PtResult<()> {
        self.insert(TypeEntry {
            name: name.into(),
            family: TypeFamily::Custom,
            user,
            wire,
        })
    }

    /// Register a [`CustomType`] under its own type name.
    pub fn register_custom<T: CustomType>(
        &mut self,
        user: Converters,
        wire: Converters,
    ) -> PtResult<()> {
        self.register(T::TYPE_NAME, user, wire)
    }

    /// Register an enum family under its type name.
    pub fn register_enum(&mut self, family: EnumFamily) -> PtResult<Arc<EnumFamily>> {
        let family = Arc::new(family);
        self.insert(TypeEntry {
            name: family.type_name().to_string(),
            family: TypeFamily::Enum(Arc::clone(&family)),
            user: family.user_converters(),
            wire: family.wire_converters(),
        })?;
        Ok(family)
    }

    /// Register a flags family under its type name.
    pub fn register_flags(&mut self, family: FlagsFamily) -> PtResult<Arc<FlagsFamily>> {
        let family = Arc::new(family);
        self.insert(TypeEntry {
            name: family.type_name().to_string(),
            family: TypeFamily::Flags(Arc::clone(&family)),
            user: family.user_converters(),
            wire: family.wire_converters(),
        })?;
        Ok(family)
    }

    /// Look up a registered type.
    pub fn entry(&self, name: &str) -> PtResult<&TypeEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| PtError::TypeNotRegistered(name.to_string()))
    }

    /// UserText converters for `name`, or [`PtError::TypeNotRegistered`].
    pub fn user_converters(&self, name: &str) -> PtResult<&Converters> {
        self.entry(name).map(|e| &e.user)
    }

    /// WireText converters for `name`, or [`PtError::TypeNotRegistered`].
    pub fn wire_converters(&self, name: &str) -> PtResult<&Converters> {
        self.entry(name).map(|e| &e.wire)
    }

    /// All entries, sorted by type name.
    pub fn entries(&self) -> Vec<&TypeEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human-readable text for any value.
    ///
    /// Newlines in text are written as a literal `\n`, the form the property
    /// editor reads back.
    pub fn to_user_text(&self, value: &Value) -> PtResult<String> {
        match value {
            Value::Boolean(b) => Ok(b.to_string()),
            Value::Integer(n) => Ok(n.to_string()),
            Value::Text(s) => Ok(s.replace('\n', "\\n")),
            Value::Ref(r) => Ok(r.to_text()),
            Value::RefList(list) => Ok(list
                .iter()
                .map(EntityRef::to_text)
                .collect::<Vec<_>>()
                .join(" ")),
            Value::TextList(list) => Ok(list.join(", ")),
            other => self.registered(other)?.user.encode(other),
        }
    }

    /// Persistence text (a JSON fragment) for any value.
    pub fn to_wire_text(&self, value: &Value) -> PtResult<String> {
        let text = match value {
            Value::Boolean(b) => serde_json::to_string(b)?,
            Value::Integer(n) => serde_json::to_string(n)?,
            Value::Text(s) => serde_json::to_string(s)?,
            Value::Ref(r) => serde_json::to_string(r)?,
            Value::RefList(list) => serde_json::to_string(list)?,
            Value::TextList(list) => serde_json::to_string(list)?,
            other => return self.registered(other)?.wire.encode(other),
        };
        Ok(text)
    }

    /// Decode persistence text into a value of `kind`.
    ///
    /// References come back unresolved.
    pub fn from_wire_text(&self, kind: &ValueKind, text: &str) -> PtResult<Value> {
        fn json<T: serde::de::DeserializeOwned>(kind: &ValueKind, text: &str) -> PtResult<T> {
            serde_json::from_str(text).map_err(|e| PtError::decode(kind, text, e.to_string()))
        }
        match kind {
            ValueKind::Boolean => json(kind, text).map(Value::Boolean),
            ValueKind::Integer => json(kind, text).map(Value::Integer),
            ValueKind::Text => json(kind, text).map(Value::Text),
            ValueKind::Ref => json(kind, text).map(Value::Ref),
            ValueKind::RefList => json(kind, text).map(Value::RefList),
            ValueKind::TextList => json(kind, text).map(Value::TextList),
            ValueKind::Enum(name) | ValueKind::Flags(name) | ValueKind::Other(name) => {
                self.wire_converters(name)?.decode(text)
            }
        }
    }

    fn registered(&self, value: &Value) -> PtResult<&TypeEntry> {
        let kind = value.kind();
        let name = kind
            .type_name()
            .ok_or_else(|| unexpected("registered", value))?;
        self.entry(name)
    }
}

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Install `registry` as the process-wide registry.
///
/// Must happen before the first call to [`global`]; afterwards the registry
/// is read-only and this fails with [`PtError::RegistryInstalled`].
pub fn install(registry: TypeRegistry) -> PtResult<&'static TypeRegistry> {
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        registry
    });
    if installed {
        Ok(global)
    } else {
        Err(PtError::RegistryInstalled)
    }
}

/// The process-wide registry, built with the built-in types on first use.
///
/// # Panics
///
/// Panics if the built-in types cannot be registered, which only happens if
/// two of them share a name.
pub fn global() -> &'static TypeRegistry {
    GLOBAL.get_or_init(|| {
        TypeRegistry::with_builtins()
            .unwrap_or_else(|e| panic!("built-in type registration failed: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{CharacterStats, GENDER, ITEM_FLAGS};
    use crate::entity::{EntityId, EntityKind};

    fn registry() -> TypeRegistry {
        TypeRegistry::with_builtins().unwrap()
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = registry();
        let family = EnumFamily::new(GENDER, &["Neuter"]).unwrap();
        assert!(matches!(
            registry.register_enum(family),
            Err(PtError::DuplicateType(name)) if name == GENDER
        ));
        // The original entry is untouched.
        let entry = registry.entry(GENDER).unwrap();
        assert!(matches!(&entry.family, TypeFamily::Enum(f) if f.names().len() == 3));
    }

    #[test]
    fn missing_type_is_reported_not_defaulted() {
        let registry = registry();
        assert!(matches!(
            registry.user_converters("Weather"),
            Err(PtError::TypeNotRegistered(name)) if name == "Weather"
        ));
        assert!(registry.wire_converters("Weather").is_err());
    }

    #[test]
    fn entries_are_sorted() {
        let registry = registry();
        let names: Vec<_> = registry.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["CharacterStats", "Gender", "ItemFlags"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn builtin_user_text() {
        let registry = registry();
        assert_eq!(registry.to_user_text(&Value::Boolean(true)).unwrap(), "true");
        assert_eq!(
            registry
                .to_user_text(&Value::Text("line1\nline2".into()))
                .unwrap(),
            "line1\\nline2"
        );
        let refs = Value::RefList(vec![
            EntityRef::to(EntityId::new(EntityKind::Exit, 3)),
            EntityRef::to(EntityId::new(EntityKind::Exit, 4)),
        ]);
        assert_eq!(registry.to_user_text(&refs).unwrap(), "exit:3 exit:4");
        assert_eq!(
            registry.to_user_text(&Value::Ref(EntityRef::none())).unwrap(),
            ""
        );
    }

    #[test]
    fn builtin_wire_round_trip() {
        let registry = registry();
        let values = [
            Value::Boolean(false),
            Value::Integer(-42),
            Value::Text("a \"quoted\"\nline".into()),
            Value::Ref(EntityRef::to(EntityId::new(EntityKind::Area, 1))),
            Value::Ref(EntityRef::none()),
            Value::RefList(vec![EntityRef::to(EntityId::new(EntityKind::Item, 8))]),
            Value::TextList(vec!["lamp".into(), "light".into()]),
        ];
        for value in values {
            let text = registry.to_wire_text(&value).unwrap();
            assert_eq!(registry.from_wire_text(&value.kind(), &text).unwrap(), value);
        }
    }

    #[test]
    fn wire_decode_reports_kind() {
        let registry = registry();
        let err = registry.from_wire_text(&ValueKind::Integer, "\"ten\"");
        assert!(matches!(err, Err(PtError::DecodeFailed { kind, .. }) if kind == "integer"));
    }

    #[test]
    fn registered_kinds_dispatch_by_name() {
        let registry = registry();
        let stats = Value::Other(CustomValue::new(CharacterStats {
            strength: 12,
            ..CharacterStats::default()
        }));
        let text = registry.to_user_text(&stats).unwrap();
        assert_eq!(text, "12 0 0 0 0 0");

        let flags_kind = ValueKind::Flags(ITEM_FLAGS.into());
        let value = registry
            .from_wire_text(&flags_kind, "\"Portable|Hidden\"")
            .unwrap();
        assert_eq!(registry.to_user_text(&value).unwrap(), "Portable|Hidden");
    }

    #[test]
    fn custom_converters_refuse_foreign_values() {
        let registry = registry();
        let user = registry.user_converters(crate::builtins::CHARACTER_STATS).unwrap();
        assert!(matches!(
            user.encode(&Value::Integer(3)),
            Err(PtError::UnexpectedKind { .. })
        ));
    }

    #[test]
    fn global_registry_has_builtins() {
        assert!(global().entry(GENDER).is_ok());
        assert!(matches!(
            install(TypeRegistry::new()),
            Err(PtError::RegistryInstalled)
        ));
    }
}
