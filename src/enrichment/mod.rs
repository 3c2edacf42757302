//! Enrichment stage: GID resolution, the cache-aside engine, output routing
//! and counters.

mod clock;
mod engine;
mod metrics;
mod resolver;
mod router;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{BatchSummary, CacheStatus, EnrichError, EnrichmentEngine, Outcome, SkipReason};
pub use metrics::{Counter, EngineMetrics, MetricsSnapshot};
pub use resolver::{GidResolver, ObjectRef};
pub use router::{Destination, JsonLinesRouter, MemoryRouter, OutputRouter, Route, RouteError};
