//! Telemetry event representation
//!
//! An event is a JSON object. The pipeline reads fields by dotted path and
//! mutates the event in exactly one place: the merged content field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field the resolved metadata is merged under.
pub const CONTENT_DATA_FIELD: &str = "contentdata";

/// A telemetry event: a nested string-keyed document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Map<String, Value>);

impl Event {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Parse a single JSON document into an event.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read the value at a dotted path such as `dimensions.content_id`.
    ///
    /// Intermediate segments must be objects; anything else ends the walk.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Read a string at a dotted path, treating blank strings as absent.
    pub fn non_blank_str(&self, path: &str) -> Option<&str> {
        self.get_path(path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Event-type marker: the part of `field` before the first `_`, lowercased.
    ///
    /// `ME_SESSION_SUMMARY` yields `me`, `OE_START` yields `oe`.
    pub fn marker(&self, field: &str) -> Option<String> {
        let eid = self.non_blank_str(field)?;
        let prefix = eid.split('_').next().unwrap_or(eid);
        Some(prefix.to_ascii_lowercase())
    }

    /// Insert `value` under `field`, replacing whatever was there.
    pub fn merge_field(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Event {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
