//! Enum and flags families generated from a single list of names.
//!
//! A family assigns ordinals (enums) or bits (flags) in declaration order and
//! provides both text encodings. UserText is the bare name, or names joined
//! with `|` for flags; WireText is the same text as a JSON string.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::error::{PtError, PtResult};
use crate::registry::Converters;
use crate::value::{EnumValue, FlagsValue, Value};

/// Separator between flag names in text form.
pub const FLAG_SEPARATOR: char = '|';

fn validate(type_name: &str, names: &[&str], max: usize) -> PtResult<Vec<String>> {
    let invalid = |reason: String| PtError::InvalidFamily {
        name: type_name.to_string(),
        reason,
    };
    if type_name.is_empty() {
        return Err(invalid("type name is empty".into()));
    }
    if names.is_empty() {
        return Err(invalid("no names declared".into()));
    }
    if names.len() > max {
        return Err(invalid(format!("{} names declared, at most {max} allowed", names.len())));
    }
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() || name.contains(FLAG_SEPARATOR) || name.contains(char::is_whitespace) {
            return Err(invalid(format!("unusable name {name:?}")));
        }
        if !seen.insert(*name) {
            return Err(invalid(format!("duplicate name {name:?}")));
        }
    }
    Ok(names.iter().map(|n| n.to_string()).collect())
}

fn wire_string(text: &str) -> PtResult<String> {
    Ok(serde_json::to_string(text)?)
}

fn from_wire_string(kind: &str, text: &str) -> PtResult<String> {
    serde_json::from_str::<String>(text).map_err(|e| PtError::decode(kind, text, e.to_string()))
}

/// A closed set of named values, one of which a property holds.
#[derive(Debug)]
pub struct EnumFamily {
    type_name: Arc<str>,
    names: Vec<String>,
}

impl EnumFamily {
    /// Declare a family. Ordinals follow the order of `names`.
    pub fn new(type_name: &str, names: &[&str]) -> PtResult<Self> {
        let names = validate(type_name, names, u32::MAX as usize)?;
        Ok(Self {
            type_name: Arc::from(type_name),
            names,
        })
    }

    /// The registered type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared names, in ordinal order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The ordinal of `name`.
    pub fn ordinal(&self, name: &str) -> Option<u32> {
        self.names.iter().position(|n| n == name).map(|i| i as u32)
    }

    /// The name at `ordinal`.
    pub fn name(&self, ordinal: u32) -> Option<&str> {
        self.names.get(ordinal as usize).map(String::as_str)
    }

    /// A value holding `name`.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.ordinal(name).map(|ordinal| self.at(ordinal))
    }

    /// The first declared member.
    pub fn default_value(&self) -> Value {
        self.at(0)
    }

    fn at(&self, ordinal: u32) -> Value {
        Value::Enum(EnumValue {
            type_name: Arc::clone(&self.type_name),
            ordinal,
        })
    }

    /// Encode a member of this family as its name.
    pub fn to_text(&self, value: &Value) -> PtResult<String> {
        let unexpected = || PtError::UnexpectedKind {
            expected: format!("enum {}", self.type_name),
            found: value.kind().to_string(),
        };
        match value {
            Value::Enum(v) if v.type_name == self.type_name => self
                .name(v.ordinal)
                .map(str::to_string)
                .ok_or_else(unexpected),
            _ => Err(unexpected()),
        }
    }

    /// Decode a member from its exact name. Unknown names are rejected.
    pub fn from_text(&self, text: &str) -> PtResult<Value> {
        let name = text.trim();
        self.value(name).ok_or_else(|| {
            PtError::decode(
                format!("enum {}", self.type_name),
                text,
                format!("expected one of {}", self.names.join(", ")),
            )
        })
    }

    /// UserText converters for this family.
    pub fn user_converters(self: &Arc<Self>) -> Converters {
        let (enc, dec) = (Arc::clone(self), Arc::clone(self));
        Converters::new(
            move |value| enc.to_text(value),
            move |text| dec.from_text(text),
        )
    }

    /// WireText converters for this family.
    pub fn wire_converters(self: &Arc<Self>) -> Converters {
        let (enc, dec) = (Arc::clone(self), Arc::clone(self));
        Converters::new(
            move |value| wire_string(&enc.to_text(value)?),
            move |text| {
                let kind = format!("enum {}", dec.type_name);
                dec.from_text(&from_wire_string(&kind, text)?)
            },
        )
    }
}

/// A set of named on/off switches stored as a bit mask.
#[derive(Debug)]
pub struct FlagsFamily {
    type_name: Arc<str>,
    names: Vec<String>,
}

impl FlagsFamily {
    /// Declare a family. The `i`-th name owns bit `1 << i`; at most 32 names.
    pub fn new(type_name: &str, names: &[&str]) -> PtResult<Self> {
        let names = validate(type_name, names, u32::BITS as usize)?;
        Ok(Self {
            type_name: Arc::from(type_name),
            names,
        })
    }

    /// The registered type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared names, in bit order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The bit owned by `name`.
    pub fn bit(&self, name: &str) -> Option<u32> {
        self.names.iter().position(|n| n == name).map(|i| 1 << i)
    }

    /// A value with exactly the named flags set. Unknown names are skipped.
    pub fn value<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Value {
        let bits = names
            .into_iter()
            .filter_map(|n| self.bit(n))
            .fold(0, |acc, bit| acc | bit);
        self.with_bits(bits)
    }

    /// A value with no flags set.
    pub fn default_value(&self) -> Value {
        self.with_bits(0)
    }

    fn with_bits(&self, bits: u32) -> Value {
        Value::Flags(FlagsValue {
            type_name: Arc::clone(&self.type_name),
            bits,
        })
    }

    /// Encode as the set flags' names joined by `|`, in declaration order.
    pub fn to_text(&self, value: &Value) -> PtResult<String> {
        match value {
            Value::Flags(v) if v.type_name == self.type_name => Ok(self
                .names
                .iter()
                .enumerate()
                .filter(|(i, _)| v.contains(*i as u32))
                .map(|(_, n)| n.as_str())
                .collect::<Vec<_>>()
                .join("|")),
            _ => Err(PtError::UnexpectedKind {
                expected: format!("flags {}", self.type_name),
                found: value.kind().to_string(),
            }),
        }
    }

    /// Decode from `|`-separated names.
    ///
    /// Names outside the family are ignored rather than rejected, so a typo
    /// drops that flag silently apart from a log line.
    pub fn from_text(&self, text: &str) -> Value {
        let mut bits = 0;
        for name in text.split(FLAG_SEPARATOR).map(str::trim).filter(|n| !n.is_empty()) {
            match self.bit(name) {
                Some(bit) => bits |= bit,
                None => warn!(family = %self.type_name, flag = name, "ignoring unknown flag"),
            }
        }
        self.with_bits(bits)
    }

    /// UserText converters for this family.
    pub fn user_converters(self: &Arc<Self>) -> Converters {
        let (enc, dec) = (Arc::clone(self), Arc::clone(self));
        Converters::new(
            move |value| enc.to_text(value),
            move |text| Ok(dec.from_text(text)),
        )
    }

    /// WireText converters for this family.
    pub fn wire_converters(self: &Arc<Self>) -> Converters {
        let (enc, dec) = (Arc::clone(self), Arc::clone(self));
        Converters::new(
            move |value| wire_string(&enc.to_text(value)?),
            move |text| {
                let kind = format!("flags {}", dec.type_name);
                Ok(dec.from_text(&from_wire_string(&kind, text)?))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directions() -> Arc<EnumFamily> {
        Arc::new(EnumFamily::new("Direction", &["North", "East", "South", "West"]).unwrap())
    }

    fn exit_flags() -> Arc<FlagsFamily> {
        Arc::new(FlagsFamily::new("ExitFlags", &["Hidden", "Locked", "Narrow"]).unwrap())
    }

    #[test]
    fn enum_ordinals_follow_declaration() {
        let family = directions();
        assert_eq!(family.ordinal("North"), Some(0));
        assert_eq!(family.ordinal("West"), Some(3));
        assert_eq!(family.name(2), Some("South"));
        assert_eq!(family.name(4), None);
        assert_eq!(family.default_value(), family.value("North").unwrap());
    }

    #[test]
    fn enum_user_text_is_the_name() {
        let family = directions();
        let user = family.user_converters();
        let east = family.value("East").unwrap();
        assert_eq!(user.encode(&east).unwrap(), "East");
        assert_eq!(user.decode("East").unwrap(), east);
    }

    #[test]
    fn enum_rejects_unknown_names() {
        let family = directions();
        let err = family.user_converters().decode("Up");
        assert!(matches!(err, Err(PtError::DecodeFailed { .. })));
        // Names are case-sensitive.
        assert!(family.from_text("north").is_err());
    }

    #[test]
    fn enum_wire_text_is_a_json_string() {
        let family = directions();
        let wire = family.wire_converters();
        let south = family.value("South").unwrap();
        assert_eq!(wire.encode(&south).unwrap(), "\"South\"");
        assert_eq!(wire.decode("\"South\"").unwrap(), south);
        assert!(wire.decode("South").is_err());
    }

    #[test]
    fn enum_refuses_values_of_other_families() {
        let family = directions();
        let other = exit_flags().default_value();
        assert!(matches!(
            family.to_text(&other),
            Err(PtError::UnexpectedKind { .. })
        ));
    }

    #[test]
    fn flags_join_in_declaration_order() {
        let family = exit_flags();
        let value = family.value(["Narrow", "Hidden"]);
        assert_eq!(family.to_text(&value).unwrap(), "Hidden|Narrow");
        assert_eq!(family.to_text(&family.default_value()).unwrap(), "");
    }

    #[test]
    fn flags_ignore_unknown_names() {
        let family = exit_flags();
        let value = family.from_text("Locked|Lokced|Narrow");
        assert_eq!(value, family.value(["Locked", "Narrow"]));
        assert_eq!(family.from_text(""), family.default_value());
    }

    #[test]
    fn flags_wire_round_trip() {
        let family = exit_flags();
        let wire = family.wire_converters();
        let value = family.value(["Hidden", "Locked"]);
        let text = wire.encode(&value).unwrap();
        assert_eq!(text, "\"Hidden|Locked\"");
        assert_eq!(wire.decode(&text).unwrap(), value);
    }

    #[test]
    fn invalid_declarations_are_rejected() {
        assert!(EnumFamily::new("Empty", &[]).is_err());
        assert!(EnumFamily::new("Twice", &["A", "A"]).is_err());
        assert!(FlagsFamily::new("Piped", &["A|B"]).is_err());
        assert!(EnumFamily::new("", &["A"]).is_err());
        let many: Vec<String> = (0..33).map(|i| format!("F{i}")).collect();
        let many: Vec<&str> = many.iter().map(String::as_str).collect();
        assert!(FlagsFamily::new("TooMany", &many).is_err());
        assert!(FlagsFamily::new("Enough", &many[..32]).is_ok());
    }
}
