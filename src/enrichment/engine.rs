//! The de-normalization engine
//!
//! One call to [`EnrichmentEngine::process`] takes one event through
//! resolve → type check → cache lookup → (refresh) → merge → route.
//! Refreshing writes the fetched entry and reads it back before merging, so
//! the event always carries what the store actually holds.

use super::clock::{Clock, SystemClock};
use super::metrics::{Counter, EngineMetrics, MetricsSnapshot};
use super::resolver::{GidResolver, ObjectRef};
use super::router::{Destination, OutputRouter, RouteError};
use crate::cache::{CacheEntry, CacheKey, ObjectType};
use crate::config::DenormConfig;
use crate::event::{Event, CONTENT_DATA_FIELD};
use crate::search::{SearchClient, SearchError};
use crate::storage::{CacheStore, StorageError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures of the external collaborators while enriching one event.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("cache store: {0}")]
    Store(#[from] StorageError),

    #[error("search: {0}")]
    Search(#[from] SearchError),

    #[error("cache entry encoding: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("cache store did not return the entry just written under {0}")]
    Unconfirmed(String),
}

/// Why an event was forwarded without enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    UnsupportedType(String),
}

/// What the cache lookup found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Expired,
}

/// Result of processing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Enriched { id: String, cache: CacheStatus },
    Failed { id: String, error: String },
}

/// Totals for a run over several events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub enriched: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Enriched { .. } => self.enriched += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Cache-aside enrichment of events with content metadata.
///
/// Events are processed one at a time; run one engine per partition for
/// parallelism.
pub struct EnrichmentEngine {
    resolver: GidResolver,
    store: Arc<dyn CacheStore>,
    search: Arc<dyn SearchClient>,
    router: Arc<dyn OutputRouter>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    success: Destination,
    failure: Destination,
    metrics: EngineMetrics,
}

impl EnrichmentEngine {
    pub fn new(
        config: &DenormConfig,
        store: Arc<dyn CacheStore>,
        search: Arc<dyn SearchClient>,
        router: Arc<dyn OutputRouter>,
    ) -> Self {
        Self {
            resolver: GidResolver::from_config(config),
            store,
            search,
            router,
            clock: Arc::new(SystemClock),
            ttl: config.ttl(),
            success: Destination::success(&config.success_destination),
            failure: Destination::failure(&config.failure_destination),
            metrics: EngineMetrics::new(),
        }
    }

    /// Replace the wall clock, e.g. with a `FixedClock` in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn resolver(&self) -> &GidResolver {
        &self.resolver
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Process one event and route it.
    ///
    /// Store and search failures never escape: the original event goes to
    /// the failure destination and `Outcome::Failed` is returned. Only a
    /// failure to deliver the event itself is an `Err`.
    pub fn process(&self, mut event: Event) -> Result<Outcome, RouteError> {
        let Some(object) = self.resolver.resolve(&event) else {
            tracing::debug!("no object id, forwarding unmodified");
            return self.skip(&event, SkipReason::MissingId);
        };

        let object_type = match object.object_type.parse::<ObjectType>() {
            Ok(object_type) => object_type,
            Err(_) => {
                tracing::debug!(object_type = %object.object_type, "unsupported object type, forwarding unmodified");
                return self.skip(&event, SkipReason::UnsupportedType(object.object_type));
            }
        };

        let key = CacheKey::new(object_type, &object.id);
        match self.denormalize(&key, &object) {
            Ok((metadata, cache)) => {
                event.merge_field(CONTENT_DATA_FIELD, metadata);
                self.router.send(&self.success, &event)?;
                self.metrics.incr(Counter::Processed);
                Ok(Outcome::Enriched { id: object.id, cache })
            }
            Err(err) => {
                tracing::warn!(id = %object.id, key = %key, error = %err, "de-normalization failed, routing to failure");
                self.router.send(&self.failure, &event)?;
                self.metrics.incr(Counter::Failed);
                Ok(Outcome::Failed {
                    id: object.id,
                    error: err.to_string(),
                })
            }
        }
    }

    /// Process events in order, stopping only if routing itself fails.
    pub fn process_all<I>(&self, events: I) -> Result<BatchSummary, RouteError>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut summary = BatchSummary::default();
        for event in events {
            let outcome = self.process(event)?;
            summary.record(&outcome);
        }
        Ok(summary)
    }

    /// Route an input that never made it to `process` (e.g. undecodable).
    pub fn reject(&self, event: &Event, reason: &str) -> Result<(), RouteError> {
        tracing::warn!(reason, "rejecting input, routing to failure");
        self.router.send(&self.failure, event)?;
        self.metrics.incr(Counter::Failed);
        Ok(())
    }

    fn skip(&self, event: &Event, reason: SkipReason) -> Result<Outcome, RouteError> {
        self.router.send(&self.success, event)?;
        self.metrics.incr(Counter::Skipped);
        Ok(Outcome::Skipped(reason))
    }

    /// Probe the cache and refresh it when needed; returns the metadata to
    /// merge as JSON.
    fn denormalize(&self, key: &CacheKey, object: &ObjectRef) -> Result<(Value, CacheStatus), EnrichError> {
        let now = self.clock.now_millis();
        let status = match self.read_entry(key)? {
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                tracing::debug!(key = %key, age_ms = entry.age_millis(now), "cache hit");
                self.metrics.incr(Counter::CacheHit);
                return Ok((entry.metadata.to_value()?, CacheStatus::Hit));
            }
            Some(entry) => {
                tracing::debug!(key = %key, age_ms = entry.age_millis(now), "cache entry expired");
                self.metrics.incr(Counter::CacheExpired);
                CacheStatus::Expired
            }
            None => {
                tracing::debug!(key = %key, "cache miss");
                self.metrics.incr(Counter::CacheMiss);
                CacheStatus::Miss
            }
        };

        let entry = self.refresh(key, &object.id)?;
        Ok((entry.metadata.to_value()?, status))
    }

    /// Read and decode an entry. Undecodable values count as absent.
    fn read_entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StorageError> {
        let Some(raw) = self.store.get(key.as_str())? else {
            return Ok(None);
        };
        match CacheEntry::decode(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                tracing::debug!(key = %key, error = %err, "undecodable cache entry, treating as miss");
                Ok(None)
            }
        }
    }

    /// Fetch, write once, then read back the entry the store persisted.
    fn refresh(&self, key: &CacheKey, id: &str) -> Result<CacheEntry, EnrichError> {
        let metadata = self.search.search_content(id)?;
        let entry = CacheEntry::new(metadata, self.clock.now_millis());
        self.store.put(key.as_str(), &entry.encode()?)?;

        self.read_entry(key)?
            .ok_or_else(|| EnrichError::Unconfirmed(key.to_string()))
    }
}
