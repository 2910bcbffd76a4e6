//! HTTP routes: search, landing page, health.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use occumatch_search::{SearchEngine, SearchError, SearchResponse};

use crate::health::HealthResponse;
use crate::ui::INDEX_HTML;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// The search engine, shared across requests.
    pub engine: Arc<SearchEngine>,
}

/// `POST /search` request body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Query text to embed and match.
    pub query: String,
    /// How many nearest neighbors to request.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Candidates below this confidence percentage are dropped.
    #[serde(default)]
    pub min_confidence: f32,
}

fn default_k() -> usize {
    5
}

/// Error payload for non-2xx responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/search", post(search_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET / — the static search page.
async fn root_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health — loaded artifact counts. Never fails the request.
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (index_vectors, meta_rows) = state.engine.counts();
    Json(HealthResponse::ok(index_vectors, meta_rows))
}

/// POST /search
async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorBody>)> {
    let response = state
        .engine
        .search(&request.query, request.k, request.min_confidence)
        .await
        .map_err(error_response)?;
    Ok(Json(response))
}

/// Map engine errors onto HTTP status codes.
fn error_response(err: SearchError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &err {
        SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
        SearchError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use occumatch_artifacts::{ArtifactPaths, VectorIndex};
    use occumatch_embeddings::{EmbeddingService, MockEmbeddingService, MockServiceFactory};

    const DIMS: usize = 48;

    async fn write_artifacts(dir: &Path) {
        let titles = ["Tailor", "Dairy Farm Worker", "Farm Labourer"];
        let embedder = MockEmbeddingService::new(DIMS);
        let texts: Vec<String> = titles.iter().map(|t| (*t).to_string()).collect();
        let vectors = embedder.embed(&texts).await.unwrap();
        VectorIndex::save(&dir.join("nco_index.db"), DIMS, &vectors).unwrap();

        std::fs::write(
            dir.join("nco_meta.csv"),
            "NCO-2015,NCO-2004,Title,Description\n\
             7531.0100,7433.10,Tailor,Makes garments to measure\n\
             6121.0100,6121.10,Dairy Farm Worker,Tends dairy cattle\n\
             9211.0100,9211.10,Farm Labourer,Performs manual farm tasks\n",
        )
        .unwrap();
        std::fs::write(dir.join("model_name.txt"), "mock-model\n").unwrap();
    }

    fn test_router(dir: &Path) -> Router {
        let factory = Arc::new(MockServiceFactory::new(DIMS));
        let engine = SearchEngine::new(ArtifactPaths::new(dir), factory as _);
        build_router(AppState {
            engine: Arc::new(engine),
        })
    }

    fn search_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_serves_the_page() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));

        let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("OccuMatch AI - NCO Semantic Search"));
    }

    #[tokio::test]
    async fn health_reports_zeros_before_load() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed = json_body(resp).await;
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["index_vectors"], 0);
        assert_eq!(parsed["meta_rows"], 0);
        assert!(parsed.get("detail").is_none());
    }

    #[tokio::test]
    async fn health_reports_counts_after_search() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path()).await;
        let app = test_router(dir.path());

        let resp = app
            .clone()
            .oneshot(search_request(r#"{"query":"Tailor"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let parsed = json_body(resp).await;
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["index_vectors"], 3);
        assert_eq!(parsed["meta_rows"], 3);
    }

    #[tokio::test]
    async fn empty_query_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path()).await;
        let app = test_router(dir.path());

        let resp = app
            .oneshot(search_request(r#"{"query":"   "}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let parsed = json_body(resp).await;
        assert_eq!(parsed["detail"], "Empty query");
    }

    #[tokio::test]
    async fn missing_artifacts_is_service_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let resp = app
            .oneshot(search_request(r#"{"query":"tailor"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let parsed = json_body(resp).await;
        let detail = parsed["detail"].as_str().unwrap();
        assert!(detail.contains("Missing required artifact"), "got: {detail}");
    }

    #[tokio::test]
    async fn search_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path()).await;
        let app = test_router(dir.path());

        let resp = app
            .oneshot(search_request(
                r#"{"query":"Tailor","k":2,"min_confidence":-1000}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed = json_body(resp).await;
        assert_eq!(parsed["query"], "Tailor");
        assert_eq!(parsed["count"], 2);
        let results = parsed["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["code_current_scheme"], "7531.0100");
        assert_eq!(results[0]["code_legacy_scheme"], "7433.10");
        assert_eq!(results[0]["title"], "Tailor");
        assert!(results[0]["confidence"].as_f64().unwrap() > 99.0);
    }

    #[tokio::test]
    async fn search_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path()).await;
        let app = test_router(dir.path());

        // k defaults to 5, min_confidence to 0
        let resp = app
            .oneshot(search_request(r#"{"query":"Tailor"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let parsed = json_body(resp).await;
        let results = parsed["results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert!(results.len() <= 5);
        assert_eq!(results[0]["title"], "Tailor");
    }

    #[tokio::test]
    async fn malformed_body_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let resp = app.oneshot(search_request(r"{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn get_on_search_is_method_not_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let req = Request::builder()
            .uri("/search")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let req = Request::builder()
            .uri("/nonexistent")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let req = Request::builder()
            .method("OPTIONS")
            .uri("/search")
            .header("origin", "https://example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn cors_header_present_on_plain_requests() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path());

        let req = Request::builder()
            .uri("/health")
            .header("origin", "https://example.com")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }
}
