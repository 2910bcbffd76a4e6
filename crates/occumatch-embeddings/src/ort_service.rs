//! ONNX Runtime embedding service (feature-gated behind `ort`).
//!
//! Downloads the model named by the artifact bundle via `hf-hub`, tokenizes
//! with `tokenizers`, runs inference via `ort`, then applies masked mean
//! pooling over non-padding tokens with L2 normalization.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::EmbeddingConfig;
use crate::errors::{EmbeddingError, Result};
use crate::normalize::l2_normalize;
use crate::service::{EmbeddingService, EmbeddingServiceFactory};

/// Combined session + tokenizer state behind a single lock.
struct InferenceState {
    session: ort::session::Session,
    tokenizer: tokenizers::Tokenizer,
}

/// ONNX-based embedding service for BERT-style sentence encoders.
///
/// Constructed fully initialized via [`OnnxEmbeddingService::load`]; the
/// session and tokenizer live behind an async lock so concurrent embed
/// calls queue rather than fail.
pub struct OnnxEmbeddingService {
    state: tokio::sync::Mutex<Option<InferenceState>>,
}

impl OnnxEmbeddingService {
    /// Download model + tokenizer and create the ONNX session.
    ///
    /// Does blocking I/O internally (model download, file reads), so the
    /// work runs on a blocking thread.
    pub async fn load(model_id: &str, config: &EmbeddingConfig) -> Result<Self> {
        let (tokenizer, session) = tokio::task::spawn_blocking({
            let model_id = model_id.to_string();
            let config = config.clone();
            move || -> Result<(tokenizers::Tokenizer, ort::session::Session)> {
                initialize_inner(&model_id, &config)
                    .map_err(|e| EmbeddingError::ModelInit(e.to_string()))
            }
        })
        .await
        .map_err(|e| EmbeddingError::Internal(format!("join error: {e}")))??;

        info!(model = model_id, "ONNX embedding service ready");
        Ok(Self {
            state: tokio::sync::Mutex::new(Some(InferenceState { session, tokenizer })),
        })
    }
}

/// Initialize model: download via `hf-hub`, create tokenizer and ONNX session.
///
/// Uses `Box<dyn Error>` internally so all calls can use `?` directly.
/// The caller maps the error to `EmbeddingError::ModelInit` at the boundary.
fn initialize_inner(
    model_id: &str,
    config: &EmbeddingConfig,
) -> std::result::Result<
    (tokenizers::Tokenizer, ort::session::Session),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let cache_dir = config.resolved_cache_dir();
    debug!(cache_dir, model = model_id, "downloading model via hf-hub");

    let api = hf_hub::api::sync::ApiBuilder::new()
        .with_cache_dir(PathBuf::from(&cache_dir))
        .build()?;

    let repo = api.model(model_id.to_string());

    let model_path = repo.get(&config.model_file())?;
    let tokenizer_path = repo.get("tokenizer.json")?;

    info!(model = %model_path.display(), tokenizer = %tokenizer_path.display(), "model files ready");

    let tok = tokenizers::Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| format!("tokenizer load: {e}"))?;

    let session = ort::session::Session::builder()?
        .with_intra_threads(config.intra_threads)?
        .with_log_level(ort::logging::LogLevel::Warning)?
        .commit_from_file(&model_path)?;

    info!(model = %model_path.display(), "ONNX model loaded");
    Ok((tok, session))
}

/// Run inference on a batch of texts.
///
/// Delegates to `run_inference_inner` which uses `Box<dyn Error>` internally,
/// then maps any error to `EmbeddingError::Inference` at the boundary.
fn run_inference(
    session: &mut ort::session::Session,
    tokenizer: &tokenizers::Tokenizer,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    run_inference_inner(session, tokenizer, texts)
        .map_err(|e| EmbeddingError::Inference(e.to_string()))
}

fn run_inference_inner(
    session: &mut ort::session::Session,
    tokenizer: &tokenizers::Tokenizer,
    texts: &[String],
) -> std::result::Result<Vec<Vec<f32>>, Box<dyn std::error::Error + Send + Sync>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let encodings = tokenizer.encode_batch(texts.to_vec(), true)?;

    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);
    if max_len == 0 {
        return Err("empty tokenization".into());
    }

    let batch_size = texts.len();

    let mut input_ids = vec![0i64; batch_size * max_len];
    let mut attention_mask = vec![0i64; batch_size * max_len];
    let mut token_type_ids = vec![0i64; batch_size * max_len];

    for (i, enc) in encodings.iter().enumerate() {
        let ids = enc.get_ids();
        let mask = enc.get_attention_mask();
        let types = enc.get_type_ids();
        let offset = i * max_len;
        for (j, &id) in ids.iter().enumerate() {
            input_ids[offset + j] = i64::from(id);
        }
        for (j, &m) in mask.iter().enumerate() {
            attention_mask[offset + j] = i64::from(m);
        }
        for (j, &t) in types.iter().enumerate() {
            token_type_ids[offset + j] = i64::from(t);
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    let shape = vec![batch_size as i64, max_len as i64];

    let input_ids_tensor = ort::value::Tensor::from_array((shape.clone(), input_ids))?;
    let attention_mask_tensor =
        ort::value::Tensor::from_array((shape.clone(), attention_mask.clone()))?;
    let token_type_ids_tensor = ort::value::Tensor::from_array((shape, token_type_ids))?;

    let outputs = session.run(ort::inputs![
        input_ids_tensor,
        attention_mask_tensor,
        token_type_ids_tensor
    ])?;

    let output_value = &outputs[0];
    let (output_shape, output_data) = output_value.try_extract_tensor::<f32>()?;

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let dims: Vec<usize> = output_shape.iter().map(|&d| d as usize).collect();
    if dims.len() != 3 || dims[0] != batch_size {
        return Err(format!("unexpected output shape: {output_shape:?}").into());
    }
    let seq_len_out = dims[1];
    let hidden_dim = dims[2];

    let mut results = Vec::with_capacity(batch_size);
    for i in 0..batch_size {
        let mut pooled = masked_mean(
            output_data,
            &attention_mask,
            i,
            max_len,
            seq_len_out,
            hidden_dim,
        );
        l2_normalize(&mut pooled);
        results.push(pooled);
    }

    Ok(results)
}

/// Mean-pool hidden states over non-padding tokens for batch item `batch_idx`.
///
/// `mask_len` is the padded input length the mask was built with; `seq_len`
/// is the sequence length of the model output.
fn masked_mean(
    data: &[f32],
    attention_mask: &[i64],
    batch_idx: usize,
    mask_len: usize,
    seq_len: usize,
    hidden_dim: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_dim];
    let mut count = 0usize;
    let mask_offset = batch_idx * mask_len;
    for j in 0..mask_len.min(seq_len) {
        if attention_mask[mask_offset + j] == 0 {
            continue;
        }
        let base = (batch_idx * seq_len + j) * hidden_dim;
        for (s, &v) in sum.iter_mut().zip(&data[base..base + hidden_dim]) {
            *s += v;
        }
        count += 1;
    }
    if count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let denom = count as f32;
        for s in &mut sum {
            *s /= denom;
        }
    }
    sum
}

#[async_trait]
impl EmbeddingService for OnnxEmbeddingService {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // The async lock is held across the blocking call, so concurrent
        // embeds queue. State is moved onto the blocking thread and
        // restored before the guard drops.
        let mut guard = self.state.lock().await;
        let mut state = guard.take().ok_or(EmbeddingError::NotReady)?;
        let texts = texts.to_vec();

        let (result, returned_state) = tokio::task::spawn_blocking(move || {
            let r = run_inference(&mut state.session, &state.tokenizer, &texts);
            (r, state)
        })
        .await
        .map_err(|e| EmbeddingError::Internal(format!("join: {e}")))?;

        // Restore state even on inference error (state is still valid)
        *guard = Some(returned_state);
        result
    }
}

/// Factory producing ONNX-backed services for whatever model the artifact
/// bundle names.
pub struct OnnxServiceFactory {
    config: EmbeddingConfig,
}

impl OnnxServiceFactory {
    /// Create a factory with the given runtime configuration.
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EmbeddingServiceFactory for OnnxServiceFactory {
    async fn create(&self, model_id: &str) -> Result<Arc<dyn EmbeddingService>> {
        let service = OnnxEmbeddingService::load(model_id, &self.config).await?;
        Ok(Arc::new(service))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ort_service_implements_trait() {
        fn assert_embedding_service<T: EmbeddingService>() {}
        assert_embedding_service::<OnnxEmbeddingService>();
    }

    #[test]
    fn factory_implements_trait() {
        fn assert_factory<T: EmbeddingServiceFactory>() {}
        assert_factory::<OnnxServiceFactory>();
    }

    #[test]
    fn masked_mean_basic() {
        // 1 item, 2 tokens, hidden 2: rows [1,3] and [3,5]
        let data = vec![1.0f32, 3.0, 3.0, 5.0];
        let mask = vec![1i64, 1];
        let pooled = masked_mean(&data, &mask, 0, 2, 2, 2);
        assert_eq!(pooled, vec![2.0, 4.0]);
    }

    #[test]
    fn masked_mean_ignores_padding() {
        let data = vec![2.0f32, 4.0, 9.0, 9.0];
        let mask = vec![1i64, 0];
        let pooled = masked_mean(&data, &mask, 0, 2, 2, 2);
        assert_eq!(pooled, vec![2.0, 4.0]);
    }

    #[test]
    fn masked_mean_batch_offset() {
        // batch of 2, seq_len 2, hidden 1
        let data = vec![1.0f32, 3.0, 5.0, 7.0];
        let mask = vec![1i64, 1, 1, 0];
        assert_eq!(masked_mean(&data, &mask, 0, 2, 2, 1), vec![2.0]);
        assert_eq!(masked_mean(&data, &mask, 1, 2, 2, 1), vec![5.0]);
    }

    #[test]
    fn masked_mean_all_padding_yields_zeros() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0];
        let mask = vec![0i64, 0];
        let pooled = masked_mean(&data, &mask, 0, 2, 2, 2);
        assert_eq!(pooled, vec![0.0, 0.0]);
    }
}
