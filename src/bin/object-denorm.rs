//! object-denorm CLI: runs the de-normalization stage over JSON lines.
//!
//! Usage:
//!   object-denorm run [--config cfg.yaml] [--db path] [--input events.ndjson]
//!   object-denorm cache <subcommand> [--config cfg.yaml] [--db path]

use clap::{Parser, Subcommand};
use object_denorm::{
    CacheEntry, CacheKey, CacheStore, Clock, ContentMetadata, DenormConfig, EnrichmentEngine,
    Event, HttpSearchClient, JsonLinesRouter, ObjectType, OpenStore, SqliteStore, SystemClock,
};
use serde_json::json;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "object-denorm",
    version,
    about = "Enrich telemetry events with cached content metadata"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process newline-delimited JSON events, writing routed events to stdout
    Run {
        /// YAML configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to SQLite cache database
        #[arg(long)]
        db: Option<PathBuf>,
        /// Read events from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Inspect or seed the cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
        /// YAML configuration file; supplies the TTL and default database path
        #[arg(long, global = true)]
        config: Option<PathBuf>,
        /// Path to SQLite cache database
        #[arg(long, global = true)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the cached entry for an object
    Get {
        /// Object identifier
        id: String,
        /// Object type
        #[arg(long = "type", default_value = "content")]
        object_type: String,
    },
    /// Store metadata from a JSON file, stamped with the current time
    Put {
        /// File holding one content metadata object
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Remove the cached entry for an object
    Evict {
        /// Object identifier
        id: String,
        /// Object type
        #[arg(long = "type", default_value = "content")]
        object_type: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("object_denorm=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default database path (~/.local/share/object-denorm/cache.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("object-denorm").join("cache.db")
}

fn open_store(db: Option<PathBuf>, config: &DenormConfig) -> Result<SqliteStore, String> {
    let db_path = db
        .or_else(|| config.store.path.clone())
        .unwrap_or_else(default_db_path);
    tracing::info!(path = %db_path.display(), "opening cache store");
    SqliteStore::open(&db_path).map_err(|e| format!("Failed to open cache store: {}", e))
}

fn load_config(path: Option<PathBuf>) -> Result<DenormConfig, String> {
    match path {
        Some(path) => DenormConfig::from_yaml_file(&path)
            .map_err(|e| format!("Failed to load config '{}': {}", path.display(), e)),
        None => Ok(DenormConfig::default()),
    }
}

fn parse_type(raw: &str) -> Result<ObjectType, String> {
    raw.parse::<ObjectType>().map_err(|e| e.to_string())
}

fn cmd_run(config: Option<PathBuf>, db: Option<PathBuf>, input: Option<PathBuf>) -> Result<(), String> {
    let config = load_config(config)?;
    let endpoint = config
        .search
        .endpoint
        .clone()
        .ok_or_else(|| "search.endpoint is not configured".to_string())?;
    let store = open_store(db, &config)?;
    let search = HttpSearchClient::new(endpoint, config.search.timeout());
    let router = JsonLinesRouter::new(std::io::stdout());
    let engine = EnrichmentEngine::new(&config, Arc::new(store), Arc::new(search), Arc::new(router));

    let reader: Box<dyn BufRead> = match input {
        Some(path) => {
            let file = std::fs::File::open(&path)
                .map_err(|e| format!("cannot open '{}': {}", path.display(), e))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    for line in reader.lines() {
        let line = line.map_err(|e| format!("read error: {}", e))?;
        if line.trim().is_empty() {
            continue;
        }
        let routed = match Event::from_json(&line) {
            Ok(event) => engine.process(event).map(|_| ()),
            Err(e) => {
                let mut raw = Event::new();
                raw.merge_field("raw", json!(line));
                engine.reject(&raw, &e.to_string())
            }
        };
        routed.map_err(|e| format!("routing failed: {}", e))?;
    }

    let metrics = engine.metrics();
    tracing::info!(
        processed = metrics.processed,
        skipped = metrics.skipped,
        failed = metrics.failed,
        cache_hit = metrics.cache_hit,
        cache_miss = metrics.cache_miss,
        cache_expired = metrics.cache_expired,
        "run complete"
    );
    Ok(())
}

fn cmd_cache_get(store: &SqliteStore, config: &DenormConfig, id: &str, object_type: &str) -> i32 {
    let key = match parse_type(object_type) {
        Ok(t) => CacheKey::new(t, id),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let raw = match store.get(key.as_str()) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            eprintln!("No entry for '{}'", key);
            return 1;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match CacheEntry::decode(&raw) {
        Ok(entry) => {
            let now = SystemClock.now_millis();
            println!("key:     {}", key);
            println!("age:     {} ms", entry.age_millis(now));
            println!("fresh:   {} (ttl {} ms)", entry.is_fresh(now, config.ttl()), config.ttl_millis);
            match store.written_at(key.as_str()) {
                Ok(Some(written_at)) => println!("written: {}", written_at),
                Ok(None) => {}
                Err(e) => tracing::warn!(key = %key, error = %e, "cannot read write time"),
            }
            match serde_json::to_string_pretty(&entry.metadata) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return 1;
                }
            }
            0
        }
        Err(e) => {
            eprintln!("Entry for '{}' is not decodable ({}):\n{}", key, e, raw);
            1
        }
    }
}

fn cmd_cache_put(store: &SqliteStore, file: &PathBuf) -> i32 {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", file.display(), e);
            return 1;
        }
    };
    let metadata: ContentMetadata = match serde_json::from_str(&text) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: invalid content metadata: {}", e);
            return 1;
        }
    };
    let key = CacheKey::new(ObjectType::Content, &metadata.identifier);
    let entry = CacheEntry::new(metadata, SystemClock.now_millis());
    let encoded = match entry.encode() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match store.put(key.as_str(), &encoded) {
        Ok(()) => {
            println!("Stored '{}'", key);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_cache_evict(store: &SqliteStore, id: &str, object_type: &str) -> i32 {
    let key = match parse_type(object_type) {
        Ok(t) => CacheKey::new(t, id),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match store.delete(key.as_str()) {
        Ok(true) => {
            println!("Evicted '{}'", key);
            0
        }
        Ok(false) => {
            eprintln!("Warning: no entry for '{}'", key);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config, db, input } => {
            if let Err(e) = cmd_run(config, db, input) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Cache { action, config, db } => {
            let config = match load_config(config) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let store = match open_store(db, &config) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let code = match action {
                CacheAction::Get { id, object_type } => cmd_cache_get(&store, &config, &id, &object_type),
                CacheAction::Put { file } => cmd_cache_put(&store, &file),
                CacheAction::Evict { id, object_type } => cmd_cache_evict(&store, &id, &object_type),
            };
            std::process::exit(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cache_commands_accept_a_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ttl_millis: 5000").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["object-denorm", "cache", "get", "do_1", "--config", path.as_str()]).unwrap();
        let Commands::Cache { config, .. } = cli.command else {
            panic!("expected cache command");
        };
        let config = load_config(config).unwrap();
        assert_eq!(config.ttl_millis, 5000);
    }

    #[test]
    fn cache_commands_default_to_standard_config() {
        let cli = Cli::try_parse_from(["object-denorm", "cache", "evict", "do_1"]).unwrap();
        let Commands::Cache { config, .. } = cli.command else {
            panic!("expected cache command");
        };
        assert!(config.is_none());
        assert_eq!(load_config(config).unwrap(), DenormConfig::default());
    }

    #[test]
    fn configured_ttl_decides_freshness_of_cached_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("cache.db")).unwrap();
        let entry = CacheEntry::new(ContentMetadata::new("do_1"), SystemClock.now_millis() - 10_000);
        store.put("content:do_1", &entry.encode().unwrap()).unwrap();

        let short = DenormConfig::default().with_ttl_millis(1_000);
        let long = DenormConfig::default().with_ttl_millis(60_000);
        let now = SystemClock.now_millis();
        let raw = store.get("content:do_1").unwrap().unwrap();
        let cached = CacheEntry::decode(&raw).unwrap();
        assert!(!cached.is_fresh(now, short.ttl()));
        assert!(cached.is_fresh(now, long.ttl()));
        assert_eq!(cmd_cache_get(&store, &short, "do_1", "content"), 0);
        assert!(store.written_at("content:do_1").unwrap().is_some());
    }
}
