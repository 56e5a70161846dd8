//! Free-form subscription metadata.
//!
//! Stores caller notes alongside internal flags. The only flag the service
//! writes itself is the authentication marker, which is set once.

use crate::domain::foundation::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const AUTHENTICATED_KEY: &str = "authenticated";
pub const AUTHENTICATED_AT_KEY: &str = "authenticated_at";

/// Open key-value bag persisted as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionMetadata(Map<String, Value>);

impl SubscriptionMetadata {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Starts the bag from caller-supplied notes.
    pub fn from_notes(notes: Option<Map<String, Value>>) -> Self {
        Self(notes.unwrap_or_default())
    }

    /// Builds metadata from a stored JSON value. Non-object values yield an empty bag.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.get(AUTHENTICATED_KEY).and_then(Value::as_bool) == Some(true)
    }

    pub fn authenticated_at(&self) -> Option<&str> {
        self.0.get(AUTHENTICATED_AT_KEY).and_then(Value::as_str)
    }

    /// Records the authentication marker.
    ///
    /// Idempotent: an existing `authenticated_at` is never overwritten.
    /// Returns `true` when the bag changed.
    pub fn mark_authenticated(&mut self, at: Timestamp) -> bool {
        let mut changed = false;
        if !self.is_authenticated() {
            self.0.insert(AUTHENTICATED_KEY.to_string(), Value::Bool(true));
            changed = true;
        }
        if self.authenticated_at().is_none() {
            self.0
                .insert(AUTHENTICATED_AT_KEY.to_string(), Value::String(at.to_rfc3339()));
            changed = true;
        }
        changed
    }
}
