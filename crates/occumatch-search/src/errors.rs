//! Error types for the search engine.

use thiserror::Error;

/// Errors surfaced by [`crate::SearchEngine`].
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was empty after trimming.
    #[error("Empty query")]
    EmptyQuery,

    /// Artifacts or the embedding model could not be loaded.
    #[error("service not ready: {0}")]
    NotReady(String),

    /// Unexpected failure while serving a query.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias for search results.
pub type Result<T> = std::result::Result<T, SearchError>;
