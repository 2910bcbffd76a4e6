//! Search engine: lazy artifact loading plus the query pipeline.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use occumatch_artifacts::{
    read_model_name, ArtifactError, ArtifactPaths, Neighbor, OccupationTable, VectorIndex,
};
use occumatch_embeddings::{EmbeddingService, EmbeddingServiceFactory};

use crate::errors::{Result, SearchError};
use crate::types::{SearchResponse, SearchResult};

/// Everything a search needs, loaded together on first use.
struct LoadedArtifacts {
    index: VectorIndex,
    table: OccupationTable,
    service: Arc<dyn EmbeddingService>,
}

/// Semantic search over the occupation index.
///
/// The vector index, the occupation table, and the embedding model named
/// by the artifacts all load on the first search. A load failure is
/// returned to that caller and retried on the next call; only a success
/// is kept.
pub struct SearchEngine {
    paths: ArtifactPaths,
    factory: Arc<dyn EmbeddingServiceFactory>,
    state: OnceCell<Arc<LoadedArtifacts>>,
}

impl SearchEngine {
    /// Create an engine over the given artifact layout. Nothing is loaded yet.
    pub fn new(paths: ArtifactPaths, factory: Arc<dyn EmbeddingServiceFactory>) -> Self {
        Self {
            paths,
            factory,
            state: OnceCell::new(),
        }
    }

    /// Run one search: embed the query, scan the index, join with metadata.
    ///
    /// `min_confidence` is a percentage floor applied per candidate;
    /// candidates below it are dropped without cutting the scan short.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        min_confidence: f32,
    ) -> Result<SearchResponse> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let loaded = self.loaded().await?;

        let embedding = loaded
            .service
            .embed_single(trimmed)
            .await
            .map_err(|e| SearchError::Internal(format!("query embedding failed: {e}")))?;

        if embedding.len() != loaded.index.dimensions() {
            return Err(SearchError::Internal(format!(
                "embedding dimension {} does not match index dimension {}",
                embedding.len(),
                loaded.index.dimensions()
            )));
        }

        let neighbors = {
            let loaded = Arc::clone(&loaded);
            tokio::task::spawn_blocking(move || loaded.index.search(&embedding, k))
                .await
                .map_err(|e| SearchError::Internal(format!("join: {e}")))?
                .map_err(|e| SearchError::Internal(e.to_string()))?
        };

        let results = assemble_results(&neighbors, &loaded.table, min_confidence);

        Ok(SearchResponse {
            query: trimmed.to_string(),
            count: results.len(),
            results,
        })
    }

    /// Loaded artifact counts for health reporting: (index vectors, metadata rows).
    ///
    /// Zeros while nothing is loaded.
    pub fn counts(&self) -> (usize, usize) {
        match self.state.get() {
            Some(loaded) => (loaded.index.len(), loaded.table.len()),
            None => (0, 0),
        }
    }

    async fn loaded(&self) -> Result<Arc<LoadedArtifacts>> {
        let loaded = self.state.get_or_try_init(|| self.load_artifacts()).await?;
        Ok(Arc::clone(loaded))
    }

    async fn load_artifacts(&self) -> Result<Arc<LoadedArtifacts>> {
        let paths = self.paths.clone();
        let (index, table, model_id) = tokio::task::spawn_blocking(
            move || -> occumatch_artifacts::Result<(VectorIndex, OccupationTable, String)> {
                paths.verify()?;
                let index = VectorIndex::open(paths.index())?;
                let table = OccupationTable::load(paths.meta())?;
                let model_id = read_model_name(paths.model_name())?;
                if index.len() != table.len() {
                    return Err(ArtifactError::Misaligned {
                        vectors: index.len(),
                        rows: table.len(),
                    });
                }
                Ok((index, table, model_id))
            },
        )
        .await
        .map_err(|e| SearchError::Internal(format!("join: {e}")))?
        .map_err(|e| SearchError::NotReady(e.to_string()))?;

        let service = self
            .factory
            .create(&model_id)
            .await
            .map_err(|e| SearchError::NotReady(e.to_string()))?;

        info!(
            vectors = index.len(),
            rows = table.len(),
            model = %model_id,
            "artifacts loaded"
        );

        Ok(Arc::new(LoadedArtifacts {
            index,
            table,
            service,
        }))
    }
}

/// Join neighbors onto occupation rows.
///
/// Positions outside the table are dropped silently; candidates below the
/// confidence floor are dropped individually. Input order is preserved.
fn assemble_results(
    neighbors: &[Neighbor],
    table: &OccupationTable,
    min_confidence: f32,
) -> Vec<SearchResult> {
    let mut out = Vec::with_capacity(neighbors.len());
    for n in neighbors {
        let Some(record) = table.get(n.position) else {
            continue;
        };
        let confidence = n.score * 100.0;
        if confidence < min_confidence {
            continue;
        }
        out.push(SearchResult {
            code_current_scheme: record.code_2015.clone(),
            code_legacy_scheme: record.code_2004.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            confidence,
        });
    }
    out
}
