//! Shared fakes for engine integration tests
//!
//! `CountingStore` and `ScriptedSearch` record every interaction so tests
//! can assert exactly how often the engine touched its collaborators.

#![allow(dead_code)]

use object_denorm::{
    CacheEntry, CacheKey, CacheStore, ContentMetadata, DenormConfig, EnrichmentEngine, Event,
    FixedClock, MemoryRouter, MemoryStore, ObjectType, SearchClient, SearchError, SearchResult,
    StorageResult,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const NOW: i64 = 1_700_000_000_000;
pub const CONTENT_ID: &str = "do_30076072";
pub const SUCCESS_TOPIC: &str = "telemetry.content.de_normalized";
pub const FAILED_TOPIC: &str = "telemetry.content.de_normalized.fail";

/// In-memory store that counts reads and writes.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    gets: AtomicUsize,
    puts: AtomicUsize,
    keys_read: Mutex<Vec<String>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value without counting it as a write.
    pub fn seed_raw(&self, key: &str, value: &str) {
        self.inner.put(key, value).unwrap();
    }

    pub fn seed(&self, entry: &CacheEntry) {
        let key = CacheKey::new(ObjectType::Content, &entry.metadata.identifier);
        self.seed_raw(key.as_str(), &entry.encode().unwrap());
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn keys_read(&self) -> Vec<String> {
        self.keys_read.lock().unwrap().clone()
    }

    pub fn stored(&self, key: &str) -> Option<CacheEntry> {
        self.inner
            .get(key)
            .unwrap()
            .map(|raw| CacheEntry::decode(&raw).unwrap())
    }
}

impl CacheStore for CountingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.keys_read.lock().unwrap().push(key.to_string());
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        self.inner.delete(key)
    }
}

/// Store that rewrites the metadata name on every write, the way a backend
/// normalizing values on ingest would. Logs each operation in order.
pub struct RewritingStore {
    inner: MemoryStore,
    name: String,
    ops: Mutex<Vec<&'static str>>,
}

impl RewritingStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: MemoryStore::new(),
            name: name.into(),
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.ops.lock().unwrap().clone()
    }
}

impl CacheStore for RewritingStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.ops.lock().unwrap().push("get");
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ops.lock().unwrap().push("put");
        let mut entry = CacheEntry::decode(value).unwrap();
        entry.metadata.set_attribute("name", json!(self.name));
        self.inner.put(key, &entry.encode().unwrap())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        self.ops.lock().unwrap().push("delete");
        self.inner.delete(key)
    }
}

/// Search client answering from a fixed table.
#[derive(Default)]
pub struct ScriptedSearch {
    contents: HashMap<String, ContentMetadata>,
    calls: Mutex<Vec<String>>,
    unavailable: bool,
}

impl ScriptedSearch {
    pub fn with(contents: Vec<ContentMetadata>) -> Self {
        Self {
            contents: contents
                .into_iter()
                .map(|c| (c.identifier.clone(), c))
                .collect(),
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SearchClient for ScriptedSearch {
    fn search_content(&self, id: &str) -> SearchResult<ContentMetadata> {
        self.calls.lock().unwrap().push(id.to_string());
        if self.unavailable {
            return Err(SearchError::Transport("connection refused".to_string()));
        }
        self.contents
            .get(id)
            .cloned()
            .ok_or_else(|| SearchError::NotFound(id.to_string()))
    }
}

pub fn content_fixture() -> ContentMetadata {
    ContentMetadata::new(CONTENT_ID)
        .with_name("Test Content")
        .with_description("Content used to verify de-normalization")
        .with_attribute("contentType", json!("Story"))
        .with_attribute("language", json!(["English"]))
        .with_attribute("me_averageRating", json!(4.333333333333333))
}

pub fn config() -> DenormConfig {
    let mut config = DenormConfig::default().with_override("me", "dimensions.content_id");
    config.success_destination = SUCCESS_TOPIC.to_string();
    config.failure_destination = FAILED_TOPIC.to_string();
    config
}

pub fn event(value: Value) -> Event {
    Event::from_value(value).unwrap()
}

pub fn oe_event() -> Event {
    event(json!({
        "eid": "OE_INTERACT",
        "ver": "2.0",
        "objecttype": "content",
        "objectid": CONTENT_ID,
        "edata": {"eks": {"type": "TOUCH", "id": "next"}}
    }))
}

pub fn me_event() -> Event {
    event(json!({
        "eid": "ME_SESSION_SUMMARY",
        "ver": "2.0",
        "dimensions": {"content_id": CONTENT_ID, "did": "device-1"},
        "edata": {"eks": {"timeSpent": 12.5}}
    }))
}

pub struct Harness {
    pub engine: EnrichmentEngine,
    pub store: Arc<CountingStore>,
    pub search: Arc<ScriptedSearch>,
    pub router: Arc<MemoryRouter>,
    pub clock: Arc<FixedClock>,
}

pub fn harness_with(config: DenormConfig, search: ScriptedSearch) -> Harness {
    let store = Arc::new(CountingStore::new());
    let search = Arc::new(search);
    let router = Arc::new(MemoryRouter::new());
    let clock = Arc::new(FixedClock::new(NOW));
    let engine = EnrichmentEngine::new(&config, store.clone(), search.clone(), router.clone())
        .with_clock(clock.clone());
    Harness {
        engine,
        store,
        search,
        router,
        clock,
    }
}

pub fn harness() -> Harness {
    harness_with(config(), ScriptedSearch::with(vec![content_fixture()]))
}
