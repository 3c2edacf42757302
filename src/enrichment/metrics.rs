//! Per-engine counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// The paths an event can take through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Enriched and routed to success
    Processed,
    /// Forwarded unmodified (no identifier or unsupported type)
    Skipped,
    CacheHit,
    CacheMiss,
    /// Entry found but older than the TTL
    CacheExpired,
    /// Routed to failure
    Failed,
}

/// Monotonic counters, one set per engine instance.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    processed: AtomicU64,
    skipped: AtomicU64,
    cache_hit: AtomicU64,
    cache_miss: AtomicU64,
    cache_expired: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub processed: u64,
    pub skipped: u64,
    pub cache_hit: u64,
    pub cache_miss: u64,
    pub cache_expired: u64,
    pub failed: u64,
}

impl MetricsSnapshot {
    /// Events that received an outgoing message.
    pub fn total(&self) -> u64 {
        self.processed + self.skipped + self.failed
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::Processed => &self.processed,
            Counter::Skipped => &self.skipped,
            Counter::CacheHit => &self.cache_hit,
            Counter::CacheMiss => &self.cache_miss,
            Counter::CacheExpired => &self.cache_expired,
            Counter::Failed => &self.failed,
        }
    }

    pub fn incr(&self, counter: Counter) {
        self.counter(counter).fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counter(counter).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            processed: self.get(Counter::Processed),
            skipped: self.get(Counter::Skipped),
            cache_hit: self.get(Counter::CacheHit),
            cache_miss: self.get(Counter::CacheMiss),
            cache_expired: self.get(Counter::CacheExpired),
            failed: self.get(Counter::Failed),
        }
    }
}
