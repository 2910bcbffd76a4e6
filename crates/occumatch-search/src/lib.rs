//! # occumatch-search
//!
//! Lazy-loading semantic search over the NCO occupation index.
//!
//! [`SearchEngine`] ties the artifact store to an embedding backend: the
//! first search loads the vector index, the occupation table, and the
//! embedding model named by the artifacts, then every search embeds the
//! query and scans the index for nearest neighbors. A failed load is
//! retried on the next call rather than poisoning the engine.
//!
//! ## Crate Position
//!
//! Depends on: occumatch-artifacts, occumatch-embeddings.
//! Depended on by: occumatch-server.

#![deny(unsafe_code)]

pub mod engine;
pub mod errors;
pub mod types;

pub use engine::SearchEngine;
pub use errors::{Result, SearchError};
pub use types::{SearchResponse, SearchResult};
