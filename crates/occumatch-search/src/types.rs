//! Wire types returned by the search engine.

use serde::{Deserialize, Serialize};

/// A single scored occupation match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Occupation code under the current numbering scheme (NCO-2015).
    pub code_current_scheme: String,
    /// Occupation code under the legacy numbering scheme (NCO-2004).
    pub code_legacy_scheme: String,
    /// Occupation title.
    pub title: String,
    /// Full occupation description.
    pub description: String,
    /// Similarity score scaled to a percentage. Not clamped or rounded.
    pub confidence: f32,
}

/// Response envelope for one search call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The trimmed query that was embedded.
    pub query: String,
    /// Number of results after filtering.
    pub count: usize,
    /// Matches in descending score order.
    pub results: Vec<SearchResult>,
}
