//! # occumatch-api
//!
//! OccuMatch server binary — wires artifacts, embeddings, and the HTTP
//! server together and runs until interrupted.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use mimalloc::MiMalloc;

use occumatch_artifacts::ArtifactPaths;
use occumatch_embeddings::EmbeddingServiceFactory;
use occumatch_search::SearchEngine;
use occumatch_server::routes::{build_router, AppState};
use occumatch_server::ServerConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Directory holding `nco_index.db`, `nco_meta.csv`, and `model_name.txt`,
/// resolved relative to the working directory.
const ARTIFACT_DIR: &str = "artifacts";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        port = config.port,
        artifact_dir = ARTIFACT_DIR,
        "starting occumatch"
    );

    let paths = ArtifactPaths::new(ARTIFACT_DIR);
    let engine = Arc::new(SearchEngine::new(paths, embedding_factory()));
    let app = build_router(AppState { engine });

    occumatch_server::serve(&config, app)
        .await
        .context("server shutdown")?;
    Ok(())
}

#[cfg(feature = "embeddings")]
fn embedding_factory() -> Arc<dyn EmbeddingServiceFactory> {
    use occumatch_embeddings::{EmbeddingConfig, OnnxServiceFactory};
    Arc::new(OnnxServiceFactory::new(EmbeddingConfig::default()))
}

#[cfg(not(feature = "embeddings"))]
fn embedding_factory() -> Arc<dyn EmbeddingServiceFactory> {
    use async_trait::async_trait;
    use occumatch_embeddings::{EmbeddingError, EmbeddingService};

    /// Stands in when the binary is built without ONNX support; every load
    /// reports the missing backend instead of serving results.
    struct DisabledFactory;

    #[async_trait]
    impl EmbeddingServiceFactory for DisabledFactory {
        async fn create(
            &self,
            _model_id: &str,
        ) -> occumatch_embeddings::Result<Arc<dyn EmbeddingService>> {
            Err(EmbeddingError::ModelInit(
                "embedding support not compiled in (enable the `embeddings` feature)".into(),
            ))
        }
    }

    Arc::new(DisabledFactory)
}
