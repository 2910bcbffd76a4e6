//! # occumatch-embeddings
//!
//! Sentence embeddings for OccuMatch query encoding.
//!
//! The production path (feature `ort`) loads a sentence-transformers model
//! by identifier via `hf-hub`, tokenizes with `tokenizers` and runs ONNX
//! inference through `ort`:
//! - Tokenize -> inference -> attention-masked mean pooling
//! - L2 normalization, so inner products against the index are cosine scores
//!
//! A deterministic SHA-256 mock covers the no-`ort` builds and the tests.
//!
//! ## Crate Position
//!
//! Standalone (no occumatch crate dependencies).
//! Depended on by: occumatch-search.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod normalize;
#[cfg(feature = "ort")]
pub mod ort_service;
pub mod service;

pub use config::EmbeddingConfig;
pub use errors::{EmbeddingError, Result};
pub use normalize::{l2_norm, l2_normalize};
#[cfg(feature = "ort")]
pub use ort_service::{OnnxEmbeddingService, OnnxServiceFactory};
pub use service::{
    EmbeddingService, EmbeddingServiceFactory, MockEmbeddingService, MockServiceFactory,
};
