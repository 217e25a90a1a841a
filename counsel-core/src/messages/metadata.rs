//! Free-form metadata attached to an assistant answer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Keys the server is known to use for source lists, in priority order.
const SOURCE_KEYS: [&str; 3] = ["documents_used", "sources_referenced", "documents_compared"];

/// Metadata sent by the server ahead of (or alongside) an answer.
///
/// The field set is open: everything the server sends, apart from the
/// `type` discriminator, is kept verbatim. Typed accessors cover the fields
/// the legal API is known to emit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, JsonValue>);

impl Metadata {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a raw field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    /// Merge another metadata payload into this one. Later values win.
    pub fn merge(&mut self, other: Metadata) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// The jurisdiction the answer was researched under.
    #[must_use]
    pub fn jurisdiction(&self) -> Option<&str> {
        self.get("jurisdiction").and_then(JsonValue::as_str)
    }

    /// Filename of the reviewed contract.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.get("filename").and_then(JsonValue::as_str)
    }

    /// Number of retrieved chunks.
    #[must_use]
    pub fn chunks_found(&self) -> Option<u64> {
        self.get("chunks_found").and_then(JsonValue::as_u64)
    }

    /// Document IDs the answer drew on.
    #[must_use]
    pub fn documents_used(&self) -> Vec<String> {
        self.string_list("documents_used")
    }

    /// Derive the source list shown under an answer.
    ///
    /// Uses the first present of `documents_used`, `sources_referenced`,
    /// `documents_compared`. Non-string entries are skipped.
    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        SOURCE_KEYS
            .iter()
            .find(|key| self.get(key).is_some_and(JsonValue::is_array))
            .map(|key| self.string_list(key))
            .unwrap_or_default()
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Map<String, JsonValue>> for Metadata {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}
