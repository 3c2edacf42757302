//! Cache entries, keys and freshness
//!
//! The store itself knows nothing about time; TTL evaluation lives here.

mod entry;
mod key;

pub use entry::{CacheEntry, DEFAULT_TTL};
pub use key::{CacheKey, ObjectType, UnsupportedObjectType};
