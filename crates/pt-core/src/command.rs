//! Parsing of the property mutation command.

use crate::entity::EntityHandle;
use crate::error::{PtError, PtResult};

/// Usage line of the property mutation command.
pub const SET_PROP_USAGE: &str = "set-prop <object-name> [#] <property-name> <value>";

/// Picks one object out of a scope by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The word typed for the object.
    pub name: String,
    /// 1-based pick among several matches.
    pub position: Option<usize>,
}

impl Selector {
    /// A selector without a position.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
        }
    }

    /// Pick the `position`th match.
    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Whether `candidate` answers to this selector.
    ///
    /// A candidate matches on its identifier token, or when the selector is
    /// a case-insensitive prefix of any word of its name.
    pub fn matches(&self, candidate: &EntityHandle) -> bool {
        let entity = candidate.read();
        if entity.id.to_string() == self.name {
            return true;
        }
        let needle = self.name.to_lowercase();
        entity
            .name()
            .split_whitespace()
            .any(|word| word.to_lowercase().starts_with(&needle))
    }

    /// Resolve to exactly one object in `scope`.
    ///
    /// Handles to the same entity count once. Without a position, zero
    /// matches is [`PtError::SelectorNotFound`] and several is
    /// [`PtError::SelectorAmbiguous`]; with one, the match at that position
    /// is taken and a position past the last match is not found.
    pub fn resolve(&self, scope: &[EntityHandle]) -> PtResult<EntityHandle> {
        let mut matches: Vec<&EntityHandle> = Vec::new();
        for candidate in scope {
            if matches.iter().any(|m| m.ptr_eq(candidate)) {
                continue;
            }
            if self.matches(candidate) {
                matches.push(candidate);
            }
        }

        let picked = match self.position {
            Some(position) => position.checked_sub(1).and_then(|i| matches.get(i)),
            None if matches.len() > 1 => {
                return Err(PtError::SelectorAmbiguous {
                    selector: self.name.clone(),
                    count: matches.len(),
                });
            }
            None => matches.first(),
        };
        picked
            .map(|handle| (*handle).clone())
            .ok_or_else(|| PtError::SelectorNotFound(self.name.clone()))
    }
}

/// `<selector> [#n] <property> <value>`, split but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPropCommand {
    /// Which object to edit.
    pub selector: Selector,
    /// The property name as typed.
    pub property: String,
    /// The value text, trimmed; may be empty.
    pub value: String,
}

impl SetPropCommand {
    /// Split command arguments.
    ///
    /// The word after the selector is taken as a position when it is a
    /// number, optionally prefixed with `#`. Everything after the property
    /// name is the value, inner spacing preserved.
    pub fn parse(args: &str) -> PtResult<Self> {
        let usage = || PtError::Usage(SET_PROP_USAGE.to_string());

        let (name, rest) = next_word(args).ok_or_else(usage)?;
        let mut selector = Selector::new(name);
        let (mut word, mut rest) = next_word(rest).ok_or_else(usage)?;
        if let Some(position) = parse_position(word) {
            selector.position = Some(position);
            (word, rest) = next_word(rest).ok_or_else(usage)?;
        }
        Ok(Self {
            selector,
            property: word.to_string(),
            value: rest.trim().to_string(),
        })
    }
}

fn next_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(text.split_once(char::is_whitespace).unwrap_or((text, "")))
}

fn parse_position(word: &str) -> Option<usize> {
    let digits = word.strip_prefix('#').unwrap_or(word);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::directory::ObjectDirectory;
    use crate::entity::EntityKind;
    use crate::value::Value;

    fn named(directory: &Arc<ObjectDirectory>, kind: EntityKind, name: &str) -> EntityHandle {
        let handle = directory.spawn(kind);
        handle
            .write()
            .properties_mut()
            .insert_unchecked("name", Value::Text(name.into()));
        handle
    }

    #[test]
    fn parse_without_position() {
        let command = SetPropCommand::parse("sword weight 12").unwrap();
        assert_eq!(command.selector, Selector::new("sword"));
        assert_eq!(command.property, "weight");
        assert_eq!(command.value, "12");
    }

    #[test]
    fn parse_with_position() {
        let plain = SetPropCommand::parse("guard 2 hp 30").unwrap();
        assert_eq!(plain.selector, Selector::new("guard").at(2));
        let hashed = SetPropCommand::parse("guard #2 hp 30").unwrap();
        assert_eq!(hashed, plain);
    }

    #[test]
    fn value_keeps_inner_spacing() {
        let command = SetPropCommand::parse("  sign  description   Keep  out.\\nNo entry.  ").unwrap();
        assert_eq!(command.value, "Keep  out.\\nNo entry.");
    }

    #[test]
    fn value_may_be_empty() {
        let command = SetPropCommand::parse("door oppositeExit").unwrap();
        assert_eq!(command.value, "");
    }

    #[test]
    fn missing_parts_report_usage() {
        for args in ["", "sword", "sword 2", "  "] {
            assert!(
                matches!(SetPropCommand::parse(args), Err(PtError::Usage(u)) if u == SET_PROP_USAGE),
                "{args:?}"
            );
        }
    }

    #[test]
    fn selector_matches_word_prefixes_and_tokens() {
        let directory = ObjectDirectory::new();
        let sword = named(&directory, EntityKind::Item, "Rusty Sword");
        assert!(Selector::new("sw").matches(&sword));
        assert!(Selector::new("RUSTY").matches(&sword));
        assert!(!Selector::new("word").matches(&sword));
        assert!(Selector::new(sword.id().to_string()).matches(&sword));
    }

    #[test]
    fn resolve_outcomes() {
        let directory = ObjectDirectory::new();
        let first = named(&directory, EntityKind::Character, "guard");
        let second = named(&directory, EntityKind::Character, "guard");
        let scope = vec![first.clone(), second.clone()];

        assert!(matches!(
            Selector::new("guard").resolve(&scope),
            Err(PtError::SelectorAmbiguous { count: 2, .. })
        ));
        assert!(Selector::new("guard").at(2).resolve(&scope).unwrap().ptr_eq(&second));
        assert!(matches!(
            Selector::new("guard").at(3).resolve(&scope),
            Err(PtError::SelectorNotFound(_))
        ));
        assert!(matches!(
            Selector::new("troll").resolve(&scope),
            Err(PtError::SelectorNotFound(_))
        ));
        assert!(
            Selector::new(first.id().to_string())
                .resolve(&scope)
                .unwrap()
                .ptr_eq(&first)
        );
    }

    #[test]
    fn repeated_handles_count_once() {
        let directory = ObjectDirectory::new();
        let lamp = named(&directory, EntityKind::Item, "lamp");
        let scope = vec![lamp.clone(), lamp.clone()];
        assert!(Selector::new("lamp").resolve(&scope).unwrap().ptr_eq(&lamp));
    }
}
