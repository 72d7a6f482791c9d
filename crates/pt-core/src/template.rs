//! Default property sets per entity kind.
//!
//! A template fixes the kind of each property an entity starts with; the
//! editor infers types from these values and the wire loader decodes
//! persisted fragments against them.

use std::sync::Arc;

use crate::builtins::{self, CharacterStats};
use crate::entity::EntityKind;
use crate::reference::EntityRef;
use crate::store::PropertyStore;
use crate::value::{CustomValue, EnumValue, FlagsValue, Value};

/// Build the default property store for `kind`.
pub fn for_kind(kind: EntityKind) -> PropertyStore {
    let mut store = PropertyStore::new();
    let mut set = |name: &str, value: Value| {
        store.insert_unchecked(name, value);
    };

    set("name", text(""));
    set("description", text(""));

    match kind {
        EntityKind::Area => {
            set("exits", Value::RefList(Vec::new()));
            set("items", Value::RefList(Vec::new()));
            set("npcs", Value::RefList(Vec::new()));
            set("players", Value::RefList(Vec::new()));
        }
        EntityKind::Exit => {
            set("destinationArea", Value::Ref(EntityRef::none()));
            set("oppositeExit", Value::Ref(EntityRef::none()));
            set("hidden", Value::Boolean(false));
        }
        EntityKind::Item | EntityKind::Character | EntityKind::Player => {
            set("plural", text(""));
            set(
                "indefiniteArticle",
                text(if kind == EntityKind::Player { "" } else { "a" }),
            );
            set("weight", Value::Integer(0));
            set("cost", Value::Integer(0));
            set(
                "flags",
                Value::Flags(FlagsValue {
                    type_name: Arc::from(builtins::ITEM_FLAGS),
                    bits: 0,
                }),
            );
            set("aliases", Value::TextList(Vec::new()));

            if kind != EntityKind::Item {
                set("race", Value::Ref(EntityRef::none()));
                set("characterClass", Value::Ref(EntityRef::none()));
                set(
                    "gender",
                    Value::Enum(EnumValue {
                        type_name: Arc::from(builtins::GENDER),
                        ordinal: 0,
                    }),
                );
                set("stats", stats());
                set("height", Value::Integer(0));
                set("hp", Value::Integer(1));
                set("maxHp", Value::Integer(1));
                set("currentArea", Value::Ref(EntityRef::none()));
                set("inventory", Value::RefList(Vec::new()));
            }
            if kind == EntityKind::Player {
                set("admin", Value::Boolean(false));
                set("passwordHash", text(""));
            }
        }
        EntityKind::Race => {
            set("adjective", text(""));
            set("startingArea", Value::Ref(EntityRef::none()));
            set("stats", stats());
            set("height", Value::Integer(0));
            set("weight", Value::Integer(0));
            set("playerSelectable", Value::Boolean(false));
        }
        EntityKind::Class => {
            set("stats", stats());
            set("playerSelectable", Value::Boolean(false));
        }
    }

    store
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn stats() -> Value {
    Value::Other(CustomValue::new(CharacterStats::default()))
}
