//! `/health` endpoint payload.

use serde::{Deserialize, Serialize};

/// Health check response body.
///
/// Reports `status: "ok"` with artifact counts, or `status: "error"` with a
/// detail message. The endpoint itself never fails; whatever happens while
/// inspecting state is folded into this payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"error"`.
    pub status: String,
    /// Number of vectors in the loaded index (0 before the first load).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_vectors: Option<usize>,
    /// Number of occupation rows in the loaded table (0 before the first load).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_rows: Option<usize>,
    /// Present only when `status` is `"error"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthResponse {
    /// Healthy payload with live artifact counts.
    pub fn ok(index_vectors: usize, meta_rows: usize) -> Self {
        Self {
            status: "ok".into(),
            index_vectors: Some(index_vectors),
            meta_rows: Some(meta_rows),
            detail: None,
        }
    }

    /// Error payload carrying the failure message.
    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            index_vectors: None,
            meta_rows: None,
            detail: Some(detail.into()),
        }
    }
}
