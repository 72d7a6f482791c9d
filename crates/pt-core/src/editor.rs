//! The admin-facing property mutation path.
//!
//! An edit learns the kind of the target property from the value it holds
//! now, reads the typed text as that kind, and only then takes the entity's
//! write lock. Every failure leaves the property at its prior value.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::command::SetPropCommand;
use crate::config::{EditorConfig, IntegerParsing};
use crate::directory::ObjectDirectory;
use crate::entity::{DisplayForms, EntityHandle, EntityId};
use crate::error::{PtError, PtResult};
use crate::naming::to_camel_case;
use crate::reference::{EntityRef, parse_ref_list};
use crate::registry::TypeRegistry;
use crate::value::{Value, ValueKind};

/// Properties whose edits change how an item-like entity reads.
const IDENTITY_PROPERTIES: [&str; 3] = ["name", "plural", "indefiniteArticle"];

/// The result of a committed edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// The edited entity.
    pub entity: EntityId,
    /// Canonical property name.
    pub property: String,
    /// The value before the edit.
    pub previous: Value,
    /// The value now stored.
    pub current: Value,
    /// Recomputed display forms, when an identity property changed.
    pub display_forms: Option<DisplayForms>,
}

impl EditOutcome {
    /// The confirmation lines sent back to the editing session.
    pub fn messages(&self) -> Vec<String> {
        let mut lines = vec![format!("Property {} modified.", self.property)];
        if let Some(forms) = &self.display_forms {
            lines.push(format!("New forms: {forms}."));
        }
        lines
    }
}

/// Applies free-text edits to entity properties.
pub struct PropertyEditor<'r> {
    registry: &'r TypeRegistry,
    directory: Arc<ObjectDirectory>,
    config: EditorConfig,
}

impl<'r> PropertyEditor<'r> {
    /// An editor with the default configuration, resolving references in
    /// `directory`.
    pub fn new(registry: &'r TypeRegistry, directory: Arc<ObjectDirectory>) -> Self {
        Self::with_config(registry, directory, EditorConfig::default())
    }

    /// An editor with an explicit configuration.
    pub fn with_config(
        registry: &'r TypeRegistry,
        directory: Arc<ObjectDirectory>,
        config: EditorConfig,
    ) -> Self {
        Self {
            registry,
            directory,
            config,
        }
    }

    /// The editor's configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Run `set-prop` arguments against the objects in `scope`.
    pub fn execute(&self, scope: &[EntityHandle], args: &str) -> PtResult<EditOutcome> {
        let command = SetPropCommand::parse(args)?;
        let target = command.selector.resolve(scope)?;
        self.set(&target, &command.property, &command.value)
    }

    /// Run `set-prop` arguments and return the lines to show the user.
    ///
    /// Never fails: every error becomes a message.
    pub fn respond(&self, scope: &[EntityHandle], args: &str) -> Vec<String> {
        match self.execute(scope, args) {
            Ok(outcome) => outcome.messages(),
            Err(e) => vec![user_message(&e)],
        }
    }

    /// Set `property` on `target` from typed `input`.
    ///
    /// The property name is canonicalized first. The property must already
    /// hold a value; its kind decides how `input` is read.
    pub fn set(&self, target: &EntityHandle, property: &str, input: &str) -> PtResult<EditOutcome> {
        let property = to_camel_case(property);
        let kind = target
            .read()
            .properties()
            .kind_of(&property)
            .ok_or_else(|| PtError::PropertyUnset(property.clone()))?;

        let current = self.decode(&property, &kind, input)?;

        let mut entity = target.write();
        let previous = entity.properties_mut().replace(&property, current.clone())?;
        entity.set_modified();
        let display_forms = if self.config.report_display_forms
            && IDENTITY_PROPERTIES.contains(&property.as_str())
        {
            entity.display_forms()
        } else {
            None
        };
        debug!(entity = %entity.id, %property, %kind, "property modified");

        Ok(EditOutcome {
            entity: entity.id,
            property,
            previous,
            current,
            display_forms,
        })
    }

    /// Read `input` as a value of `kind`.
    pub fn decode(&self, property: &str, kind: &ValueKind, input: &str) -> PtResult<Value> {
        match kind {
            ValueKind::Boolean => Ok(Value::Boolean(input == "true")),
            ValueKind::Integer => self.decode_integer(input).map(Value::Integer),
            ValueKind::Text => Ok(Value::Text(input.replace("\\n", "\n"))),
            ValueKind::Ref => {
                let reference = EntityRef::parse(input)?;
                reference.resolve_in(&self.directory)?;
                Ok(Value::Ref(reference))
            }
            ValueKind::RefList => parse_ref_list(input, &self.directory).map(Value::RefList),
            ValueKind::Enum(name) | ValueKind::Flags(name) | ValueKind::Other(name) => {
                self.registry.user_converters(name)?.decode(input)
            }
            ValueKind::TextList => Err(PtError::UnsupportedKind {
                property: property.to_string(),
                kind: kind.to_string(),
            }),
        }
    }

    fn decode_integer(&self, input: &str) -> PtResult<i64> {
        let parsed = input.trim().parse::<i64>();
        match self.config.integer_parsing {
            IntegerParsing::Strict => {
                parsed.map_err(|e| PtError::decode(ValueKind::Integer, input, e.to_string()))
            }
            IntegerParsing::Lenient => Ok(parsed.unwrap_or(0)),
        }
    }
}

impl fmt::Debug for PropertyEditor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyEditor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The line shown to the user for a failed edit.
pub fn user_message(error: &PtError) -> String {
    match error {
        PtError::SelectorNotFound(_) => "Object not found.".to_string(),
        PtError::SelectorAmbiguous { .. } => "Object is not unique.".to_string(),
        PtError::UnsupportedKind { property, .. } => {
            format!("Setting property {property} is not supported.")
        }
        PtError::PropertyUnset(property) => format!("Property {property} is not set."),
        PtError::Usage(usage) => format!("Usage: {usage}"),
        other => {
            let text = other.to_string();
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
                None => text,
            }
        }
    }
}
