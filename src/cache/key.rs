//! Object types and deterministic cache keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Object kinds that can be de-normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Content,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type name was not one of the supported object types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedObjectType(pub String);

impl fmt::Display for UnsupportedObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported object type: {}", self.0)
    }
}

impl std::error::Error for UnsupportedObjectType {}

impl FromStr for ObjectType {
    type Err = UnsupportedObjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "content" => Ok(Self::Content),
            _ => Err(UnsupportedObjectType(s.to_string())),
        }
    }
}

/// Store key for one object: `"{type}:{id}"`.
///
/// Type names never contain `:`, so the first `:` separates type from id
/// and distinct objects never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(object_type: ObjectType, id: &str) -> Self {
        Self(format!("{}:{}", object_type.as_str(), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a key back into its object type and id.
    pub fn parse(key: &str) -> Option<(ObjectType, &str)> {
        let (object_type, id) = key.split_once(':')?;
        Some((object_type.parse().ok()?, id))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_case_insensitively() {
        assert_eq!("content".parse::<ObjectType>(), Ok(ObjectType::Content));
        assert_eq!(" Content ".parse::<ObjectType>(), Ok(ObjectType::Content));
        assert!("item".parse::<ObjectType>().is_err());
        assert!("".parse::<ObjectType>().is_err());
    }

    #[test]
    fn key_is_type_prefixed_id() {
        let key = CacheKey::new(ObjectType::Content, "do_30076072");
        assert_eq!(key.as_str(), "content:do_30076072");
    }

    #[test]
    fn ids_containing_separator_stay_distinct() {
        let a = CacheKey::new(ObjectType::Content, "a:b");
        let b = CacheKey::new(ObjectType::Content, "a");
        assert_ne!(a, b);
        assert_eq!(CacheKey::parse(a.as_str()), Some((ObjectType::Content, "a:b")));
    }

    #[test]
    fn parse_rejects_unknown_prefix() {
        assert_eq!(CacheKey::parse("item:do_1"), None);
        assert_eq!(CacheKey::parse("no-separator"), None);
    }
}
