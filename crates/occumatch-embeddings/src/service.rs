//! Embedding service and factory traits, plus mock implementations.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::errors::{EmbeddingError, Result};
use crate::normalize::l2_normalize;

/// Trait for embedding text into unit-length vectors.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text (default: calls `embed` with one item).
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Inference("empty result".into()))
    }
}

/// Creates an embedding service for a model identifier.
///
/// The identifier arrives from the `model_name.txt` artifact at load time,
/// so the backend is resolved per deployment rather than at compile time.
#[async_trait]
pub trait EmbeddingServiceFactory: Send + Sync {
    /// Instantiate a ready-to-use service for the named model.
    async fn create(&self, model_id: &str) -> Result<Arc<dyn EmbeddingService>>;
}

/// Mock embedding service for testing.
///
/// Generates deterministic embeddings by hashing input text with SHA-256,
/// using the hash bytes as seeds for the vector components.
pub struct MockEmbeddingService {
    dims: usize,
    fail: AtomicBool,
}

impl MockEmbeddingService {
    /// Create a new mock service with the given dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            fail: AtomicBool::new(false),
        }
    }

    /// Make subsequent `embed` calls fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        let mut v: Vec<f32> = (0..self.dims)
            .map(|i| {
                let byte_idx = i % hash.len();
                // Map byte to [-1, 1] range
                (f32::from(hash[byte_idx]) / 127.5) - 1.0
            })
            .collect();

        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Inference("simulated failure".into()));
        }
        Ok(texts.iter().map(|t| self.hash_to_vector(t)).collect())
    }
}

/// Mock factory that hands out [`MockEmbeddingService`] instances and
/// records every request, so tests can assert load-once behavior.
pub struct MockServiceFactory {
    dims: usize,
    fail: AtomicBool,
    created: AtomicUsize,
    requests: parking_lot::Mutex<Vec<String>>,
}

impl MockServiceFactory {
    /// Create a factory producing mocks of the given dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            fail: AtomicBool::new(false),
            created: AtomicUsize::new(0),
            requests: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent `create` calls fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// How many services have been created so far.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Model identifiers requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl EmbeddingServiceFactory for MockServiceFactory {
    async fn create(&self, model_id: &str) -> Result<Arc<dyn EmbeddingService>> {
        self.requests.lock().push(model_id.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::ModelInit(format!(
                "unknown model: {model_id}"
            )));
        }
        let _ = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockEmbeddingService::new(self.dims)))
    }
}
