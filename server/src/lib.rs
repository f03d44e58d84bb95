use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use boolsearch_core::{DocId, Searcher};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub source: String,
    pub path: String,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl ToString) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.to_string() })))
}

/// The searcher seeks a single postings file handle, so requests take turns.
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<Mutex<Searcher>>,
}

pub fn build_app(index_dir: String) -> Result<Router> {
    let searcher = Searcher::open(&index_dir)?;
    tracing::info!(index_dir = %index_dir, num_docs = searcher.doc_count(), num_terms = searcher.num_terms(), "index loaded");
    let app_state = AppState { searcher: Arc::new(Mutex::new(searcher)) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);

    let mut searcher = state.searcher.lock();
    let ids = searcher.search(&params.q).map_err(|err| {
        if err.is_bad_query() {
            api_error(StatusCode::BAD_REQUEST, err)
        } else {
            tracing::error!(error = %err, "search failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, err)
        }
    })?;

    let results = ids
        .iter()
        .filter_map(|&id| searcher.document(id))
        .take(k)
        .map(|doc| SearchHit { doc_id: doc.id, source: doc.source_tag.clone(), path: doc.path.clone() })
        .collect();
    drop(searcher);

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: ids.len(), results }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let searcher = state.searcher.lock();
    match searcher.document(doc_id) {
        Some(doc) => Ok(Json(serde_json::json!({
            "doc_id": doc.id,
            "source": doc.source_tag,
            "path": doc.path,
        }))),
        None => Err(api_error(StatusCode::NOT_FOUND, "not found")),
    }
}
