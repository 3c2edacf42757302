//! Search client trait definitions

use super::content::ContentMetadata;
use thiserror::Error;

/// Errors that can occur while looking up content metadata
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Content not found: {0}")]
    NotFound(String),

    #[error("Search service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Search transport error: {0}")]
    Transport(String),

    #[error("Search response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Synchronous lookup of object metadata by identifier.
///
/// Implementations own their transport concerns (timeouts, retries).
/// Callers treat every error as final for the event at hand.
pub trait SearchClient: Send + Sync {
    /// Fetch the metadata of the content object with the given identifier.
    fn search_content(&self, id: &str) -> SearchResult<ContentMetadata>;
}
