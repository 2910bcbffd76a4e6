//! Embedding configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the ONNX embedding backend.
///
/// The model identifier itself is not configured here — it arrives at load
/// time from the `model_name.txt` artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingConfig {
    /// Local model cache directory (may contain `~`).
    pub cache_dir: String,
    /// Optional quantization suffix: `Some("quantized")` loads
    /// `onnx/model_quantized.onnx` instead of `onnx/model.onnx`.
    pub dtype: Option<String>,
    /// Intra-op thread count for the ONNX session.
    pub intra_threads: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            cache_dir: "~/.occumatch/models".into(),
            dtype: None,
            intra_threads: 2,
        }
    }
}

impl EmbeddingConfig {
    /// Resolve the cache directory, expanding `~/` to the home directory.
    pub fn resolved_cache_dir(&self) -> String {
        if self.cache_dir.starts_with("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return format!("{}{}", home, &self.cache_dir[1..]);
            }
        }
        self.cache_dir.clone()
    }

    /// ONNX model file name inside the model repository.
    pub fn model_file(&self) -> String {
        match &self.dtype {
            Some(dtype) => format!("onnx/model_{dtype}.onnx"),
            None => "onnx/model.onnx".to_string(),
        }
    }
}
