//! Content search service client
//!
//! The engine depends only on the `SearchClient` trait. `HttpSearchClient`
//! talks to the composite search API over HTTP.

mod content;
mod http;
mod traits;

pub use content::ContentMetadata;
pub use http::HttpSearchClient;
pub use traits::{SearchClient, SearchError, SearchResult};
