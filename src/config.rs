//! Stage configuration
//!
//! Loaded once at startup, either from a YAML file or from the flat
//! `key = value` properties a stream job is deployed with.

use crate::cache::{ObjectType, DEFAULT_TTL};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SUCCESS_DESTINATION: &str = "telemetry.content.de_normalized";
pub const DEFAULT_FAILURE_DESTINATION: &str = "telemetry.content.de_normalized.fail";

/// Property keys understood by [`DenormConfig::from_properties`].
pub mod keys {
    pub const SUCCESS_TOPIC: &str = "output.success.topic.name";
    pub const FAILED_TOPIC: &str = "output.failed.topic.name";
    pub const OVERRIDDEN_EVENTS: &str = "gid.overridden.events";
    pub const STORE_TTL: &str = "object.store.ttl";
    pub const SEARCH_ENDPOINT: &str = "search.service.endpoint";
    pub const SEARCH_TIMEOUT: &str = "search.service.timeout";
    pub const STORE_PATH: &str = "object.store.path";
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Search client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: Option<String>,
    pub timeout_millis: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_millis: 3_000,
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

/// Cache store settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file; the platform data directory when unset
    pub path: Option<PathBuf>,
}

/// Full configuration of the de-normalization stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenormConfig {
    pub success_destination: String,
    pub failure_destination: String,
    /// Maximum age of a cache entry in milliseconds
    pub ttl_millis: u64,
    /// Event-type marker → dotted path of the identifier for that event type
    pub gid_overrides: BTreeMap<String, String>,
    /// Identifier path for events without an override
    pub default_gid_field: String,
    pub object_type_field: String,
    /// Type assumed when an event does not declare one
    pub default_object_type: String,
    /// Field whose prefix classifies the event (`ME_...` → `me`)
    pub event_marker_field: String,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

impl Default for DenormConfig {
    fn default() -> Self {
        Self {
            success_destination: DEFAULT_SUCCESS_DESTINATION.to_string(),
            failure_destination: DEFAULT_FAILURE_DESTINATION.to_string(),
            ttl_millis: DEFAULT_TTL.as_millis() as u64,
            gid_overrides: BTreeMap::new(),
            default_gid_field: "objectid".to_string(),
            object_type_field: "objecttype".to_string(),
            default_object_type: ObjectType::Content.as_str().to_string(),
            event_marker_field: "eid".to_string(),
            search: SearchConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl DenormConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis)
    }

    pub fn with_override(mut self, marker: impl Into<String>, path: impl Into<String>) -> Self {
        self.gid_overrides.insert(marker.into(), path.into());
        self
    }

    pub fn with_ttl_millis(mut self, ttl_millis: u64) -> Self {
        self.ttl_millis = ttl_millis;
        self
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Build from flat job properties.
    ///
    /// `gid.overridden.events` lists property keys such as `me.gid.field`.
    /// Each listed key holds the identifier path, and its first segment is
    /// the event marker it applies to.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(topic) = props.get(keys::SUCCESS_TOPIC) {
            config.success_destination = topic.trim().to_string();
        }
        if let Some(topic) = props.get(keys::FAILED_TOPIC) {
            config.failure_destination = topic.trim().to_string();
        }
        if let Some(ttl) = props.get(keys::STORE_TTL) {
            config.ttl_millis = parse_millis(keys::STORE_TTL, ttl)?;
        }
        if let Some(endpoint) = props.get(keys::SEARCH_ENDPOINT) {
            config.search.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(timeout) = props.get(keys::SEARCH_TIMEOUT) {
            config.search.timeout_millis = parse_millis(keys::SEARCH_TIMEOUT, timeout)?;
        }
        if let Some(path) = props.get(keys::STORE_PATH) {
            config.store.path = Some(PathBuf::from(path.trim()));
        }

        let listed = props.get(keys::OVERRIDDEN_EVENTS).map(String::as_str).unwrap_or("");
        for key in listed.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            let path = props.get(key).ok_or_else(|| {
                ConfigError::Invalid(format!("override key '{}' has no configured path", key))
            })?;
            let marker = key.split('.').next().unwrap_or(key).to_ascii_lowercase();
            config.gid_overrides.insert(marker, path.trim().to_string());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.success_destination.trim().is_empty() || self.failure_destination.trim().is_empty() {
            return Err(ConfigError::Invalid("destinations must not be empty".to_string()));
        }
        if self.success_destination == self.failure_destination {
            return Err(ConfigError::Invalid(format!(
                "success and failure destinations are both '{}'",
                self.success_destination
            )));
        }
        if self.default_gid_field.trim().is_empty() {
            return Err(ConfigError::Invalid("default_gid_field must not be empty".to_string()));
        }
        if let Some((marker, _)) = self.gid_overrides.iter().find(|(_, path)| path.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("override for '{}' has an empty path", marker)));
        }
        if self.default_object_type.parse::<ObjectType>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "default_object_type '{}' is not supported",
                self.default_object_type
            )));
        }
        Ok(())
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(format!("{} must be a non-negative integer, got '{}'", key, raw)))
}
