use std::collections::BTreeMap;

use crate::error::{PtError, PtResult};
use crate::value::{Value, ValueKind};

/// Per-entity mapping from canonical property name to value.
///
/// A property's kind is fixed by the first value stored under its name.
/// [`PropertyStore::replace`] enforces that; [`PropertyStore::insert_unchecked`]
/// does not and is reserved for construction and deserialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyStore {
    values: BTreeMap<String, Value>,
}

impl PropertyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property's current value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The kind a property holds, if it has ever been set.
    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.values.get(name).map(Value::kind)
    }

    /// Whether the property has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Store a value without any validation.
    pub fn insert_unchecked(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Replace an existing property's value, keeping its kind.
    ///
    /// Returns the previous value. Fails with [`PtError::PropertyUnset`] if
    /// the property was never set and with [`PtError::KindMismatch`] if
    /// `value` is of a different kind; the store is unchanged on failure.
    pub fn replace(&mut self, name: &str, value: Value) -> PtResult<Value> {
        let slot = self
            .values
            .get_mut(name)
            .ok_or_else(|| PtError::PropertyUnset(name.to_string()))?;
        let expected = slot.kind();
        let found = value.kind();
        if expected != found {
            return Err(PtError::KindMismatch {
                property: name.to_string(),
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(std::mem::replace(slot, value))
    }

    /// Iterate over properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store has no properties.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
