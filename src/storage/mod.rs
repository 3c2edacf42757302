//! Cache store backends
//!
//! Backends implement the `CacheStore` trait. `SqliteStore` persists entries
//! across restarts; `MemoryStore` keeps them in process.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CacheStore, OpenStore, StorageError, StorageResult};
