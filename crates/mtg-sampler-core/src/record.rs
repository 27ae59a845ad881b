//! Schema-less card records.
//!
//! The card API returns objects with dozens of optional fields. The sampler
//! only ever inspects two of them (a presence-tested identifier such as
//! `multiverseid`, and a dedup key such as `name`), so a [`Record`] keeps the
//! raw JSON object intact and exposes typed accessors for those lookups.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single card object, stored as its raw JSON field map.
///
/// Serializes transparently: a `Record` round-trips as the plain JSON
/// object it was parsed from, with field order preserved by `serde_json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style field insert, mostly for tests and fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Raw value of `field`, if the key exists (including explicit `null`).
    pub fn field(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// True when `field` exists and is not JSON `null`.
    pub fn has_field(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(v) if !v.is_null())
    }

    /// The card's `name`, when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Dedup key derived from `field`.
    ///
    /// Strings compare by their contents; any other non-null value compares
    /// by its compact JSON text.
    pub fn key_of(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
