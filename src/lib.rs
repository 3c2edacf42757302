//! object-denorm: Cache-Aside Object De-normalization
//!
//! A telemetry pipeline stage that embeds content metadata into events.
//! Metadata comes from an external search service and is cached in a
//! key/value store with a freshness bound, so repeated references to the
//! same object cost one lookup per TTL window.
//!
//! # Core Concepts
//!
//! - **GID resolution**: which field holds the object id, per event type
//! - **Cache entries**: metadata snapshots stamped with the time they were cached
//! - **Routing**: every event leaves exactly once, to success or failure
//!
//! # Example
//!
//! ```
//! use object_denorm::{DenormConfig, EnrichmentEngine, MemoryRouter, MemoryStore, HttpSearchClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = DenormConfig::default().with_override("me", "dimensions.content_id");
//! let engine = EnrichmentEngine::new(
//!     &config,
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(HttpSearchClient::new("http://localhost:9000/v3/search", Duration::from_secs(3))),
//!     Arc::new(MemoryRouter::new()),
//! );
//! assert_eq!(engine.metrics().total(), 0);
//! ```

pub mod cache;
pub mod config;
pub mod enrichment;
pub mod event;
pub mod search;
pub mod storage;

pub use cache::{CacheEntry, CacheKey, ObjectType};
pub use config::{ConfigError, DenormConfig};
pub use enrichment::{
    CacheStatus, Clock, Destination, EnrichError, EnrichmentEngine, FixedClock, GidResolver,
    JsonLinesRouter, MemoryRouter, MetricsSnapshot, Outcome, OutputRouter, Route, RouteError,
    SkipReason, SystemClock,
};
pub use event::{Event, CONTENT_DATA_FIELD};
pub use search::{ContentMetadata, HttpSearchClient, SearchClient, SearchError, SearchResult};
pub use storage::{CacheStore, MemoryStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
