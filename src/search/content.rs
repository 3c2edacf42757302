//! Content metadata returned by the search service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key the identifier is stored under; never kept among the attributes.
const IDENTIFIER: &str = "identifier";

/// Denormalized attributes of a content object.
///
/// Only the identifier is guaranteed. Every other attribute is kept exactly
/// as the search service returned it, so a cache round trip never drops or
/// retypes data (`"medium": ["English"]` and `"name": null` both survive).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub identifier: String,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl ContentMetadata {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_attribute("name", Value::String(name.into()))
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.with_attribute("description", Value::String(description.into()))
    }

    /// Set an attribute. `identifier` is not an attribute and is ignored;
    /// use the field.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if key != IDENTIFIER {
            self.attributes.insert(key, value);
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn name(&self) -> Option<&str> {
        self.attribute("name").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.attribute("description").and_then(Value::as_str)
    }

    /// The JSON object merged into events.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
