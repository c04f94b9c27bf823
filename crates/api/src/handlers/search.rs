//! Handlers for relevance and fuzzy search.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use topichub_core::search::{
    clamp_limit, validate_threshold, SearchResult, DEFAULT_FUZZY_THRESHOLD, DEFAULT_SEARCH_LIMIT,
    MAX_SEARCH_LIMIT,
};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct FuzzySearchParams {
    pub q: Option<String>,
    pub threshold: Option<f64>,
    pub limit: Option<usize>,
}

/// GET /search?q=query&limit=N
pub async fn search_topics(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let q = params.q.unwrap_or_default();
    if q.trim().is_empty() {
        return Ok(Json(DataResponse {
            data: Vec::<SearchResult>::new(),
        }));
    }

    let limit = clamp_limit(params.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
    let results = state.store.search(&q, limit);
    tracing::debug!(query = %q, results = results.len(), "Topic search");
    Ok(Json(DataResponse { data: results }))
}

/// GET /search/fuzzy?q=query&threshold=0.7&limit=N
///
/// Typo-tolerant search; `threshold` must lie in `(0, 1]`.
pub async fn fuzzy_search_topics(
    State(state): State<AppState>,
    Query(params): Query<FuzzySearchParams>,
) -> AppResult<impl IntoResponse> {
    let threshold = params.threshold.unwrap_or(DEFAULT_FUZZY_THRESHOLD);
    validate_threshold(threshold)?;

    let q = params.q.unwrap_or_default();
    if q.trim().is_empty() {
        return Ok(Json(DataResponse {
            data: Vec::<SearchResult>::new(),
        }));
    }

    let limit = clamp_limit(params.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
    let results = state.store.fuzzy_search(&q, threshold, limit)?;
    tracing::debug!(query = %q, threshold, results = results.len(), "Fuzzy topic search");
    Ok(Json(DataResponse { data: results }))
}
