//! GID resolution
//!
//! Event types differ only in where they keep the object identifier, so
//! the differences live in a lookup table keyed by event marker rather than
//! in per-type code.

use crate::config::DenormConfig;
use crate::event::Event;
use std::collections::HashMap;

/// The object an event refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    /// Non-blank, trimmed identifier
    pub id: String,
    /// Declared type name, not yet checked against the supported set
    pub object_type: String,
}

/// Finds the object identifier inside an event.
#[derive(Debug, Clone)]
pub struct GidResolver {
    overrides: HashMap<String, String>,
    default_field: String,
    marker_field: String,
    type_field: String,
    default_type: String,
}

impl GidResolver {
    pub fn new(default_field: impl Into<String>) -> Self {
        let defaults = DenormConfig::default();
        Self {
            overrides: HashMap::new(),
            default_field: default_field.into(),
            marker_field: defaults.event_marker_field,
            type_field: defaults.object_type_field,
            default_type: defaults.default_object_type,
        }
    }

    pub fn from_config(config: &DenormConfig) -> Self {
        Self {
            overrides: config
                .gid_overrides
                .iter()
                .map(|(marker, path)| (marker.to_ascii_lowercase(), path.clone()))
                .collect(),
            default_field: config.default_gid_field.clone(),
            marker_field: config.event_marker_field.clone(),
            type_field: config.object_type_field.clone(),
            default_type: config.default_object_type.clone(),
        }
    }

    /// Register an identifier path for events carrying `marker`.
    pub fn with_override(mut self, marker: impl Into<String>, path: impl Into<String>) -> Self {
        self.overrides.insert(marker.into().to_ascii_lowercase(), path.into());
        self
    }

    /// The path the identifier is read from for this event.
    pub fn gid_path(&self, event: &Event) -> &str {
        event
            .marker(&self.marker_field)
            .and_then(|marker| self.overrides.get(&marker))
            .map(String::as_str)
            .unwrap_or(&self.default_field)
    }

    /// Resolve the referenced object, or `None` when the identifier is
    /// missing or blank.
    pub fn resolve(&self, event: &Event) -> Option<ObjectRef> {
        let id = event.non_blank_str(self.gid_path(event))?;
        let object_type = event
            .non_blank_str(&self.type_field)
            .unwrap_or(&self.default_type);
        Some(ObjectRef {
            id: id.to_string(),
            object_type: object_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        Event::from_value(value).unwrap()
    }

    fn resolver() -> GidResolver {
        GidResolver::new("objectid").with_override("me", "dimensions.content_id")
    }

    #[test]
    fn default_field_without_override() {
        let e = event(json!({"eid": "OE_START", "objecttype": "content", "objectid": "do_30076072"}));
        assert_eq!(resolver().gid_path(&e), "objectid");
        assert_eq!(
            resolver().resolve(&e),
            Some(ObjectRef { id: "do_30076072".into(), object_type: "content".into() })
        );
    }

    #[test]
    fn override_path_wins_for_marked_events() {
        let e = event(json!({
            "eid": "ME_SESSION_SUMMARY",
            "objectid": "do_ignored",
            "dimensions": {"content_id": "do_30076072"}
        }));
        assert_eq!(resolver().gid_path(&e), "dimensions.content_id");
        assert_eq!(resolver().resolve(&e).unwrap().id, "do_30076072");
    }

    #[test]
    fn override_marker_matching_ignores_case() {
        let r = GidResolver::new("objectid").with_override("ME", "dimensions.content_id");
        let e = event(json!({"eid": "me_item_usage", "dimensions": {"content_id": "do_9"}}));
        assert_eq!(r.resolve(&e).unwrap().id, "do_9");
    }

    #[test]
    fn missing_and_blank_ids_are_absent() {
        let r = resolver();
        assert_eq!(r.resolve(&event(json!({"objecttype": "content"}))), None);
        assert_eq!(r.resolve(&event(json!({"objectid": "", "objecttype": "content"}))), None);
        assert_eq!(r.resolve(&event(json!({"objectid": "  ", "objecttype": "content"}))), None);
        assert_eq!(r.resolve(&event(json!({"eid": "ME_X", "dimensions": {}}))), None);
    }

    #[test]
    fn untyped_events_take_the_default_type() {
        let e = event(json!({"eid": "ME_SESSION_SUMMARY", "dimensions": {"content_id": "do_1"}}));
        assert_eq!(resolver().resolve(&e).unwrap().object_type, "content");
    }

    #[test]
    fn declared_type_is_passed_through_unchecked() {
        let e = event(json!({"objectid": "do_1", "objecttype": "item"}));
        assert_eq!(resolver().resolve(&e).unwrap().object_type, "item");
    }

    #[test]
    fn from_config_reads_override_table() {
        let config = DenormConfig::default().with_override("me", "dimensions.content_id");
        let r = GidResolver::from_config(&config);
        let e = event(json!({"eid": "ME_SESSION_SUMMARY", "dimensions": {"content_id": "do_2"}}));
        assert_eq!(r.resolve(&e).unwrap().id, "do_2");
    }
}
