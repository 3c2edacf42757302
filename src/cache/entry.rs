//! Cached metadata snapshots and their persisted encoding

use crate::search::ContentMetadata;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum age of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_millis(60_000);

/// A point-in-time snapshot of fetched metadata.
///
/// Persisted as `{"metadata": {...}, "cachedAt": <epoch millis>}`. The
/// encoding outlives any one process, so field names are part of the
/// storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub metadata: ContentMetadata,
    pub cached_at: i64,
}

impl CacheEntry {
    pub fn new(metadata: ContentMetadata, cached_at: i64) -> Self {
        Self { metadata, cached_at }
    }

    /// Milliseconds elapsed since the entry was cached. Negative for entries
    /// stamped in the future.
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.cached_at)
    }

    /// Fresh iff `now - cached_at <= ttl`.
    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now_millis) <= ttl_millis
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn decode(encoded: &str) -> serde_json::Result<Self> {
        serde_json::from_str(encoded)
    }
}
