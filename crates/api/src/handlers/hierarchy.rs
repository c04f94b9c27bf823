//! Handlers for relationship analysis and whole-hierarchy statistics.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use topichub_core::analysis;
use topichub_core::types::TopicId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PairParams {
    pub a: TopicId,
    pub b: TopicId,
}

#[derive(Debug, Deserialize)]
pub struct StatisticsParams {
    pub root: Option<TopicId>,
}

/// GET /hierarchy/relationship?a=X&b=Y
///
/// How `a` relates to `b`.
pub async fn relationship(
    State(state): State<AppState>,
    Query(params): Query<PairParams>,
) -> AppResult<impl IntoResponse> {
    let relationship = state.store.relationship(params.a, params.b)?;
    Ok(Json(DataResponse { data: relationship }))
}

/// GET /hierarchy/common-ancestor?a=X&b=Y
///
/// Lowest common ancestor, `null` when the topics share no tree.
pub async fn common_ancestor(
    State(state): State<AppState>,
    Query(params): Query<PairParams>,
) -> AppResult<impl IntoResponse> {
    let (a, b) = (params.a, params.b);
    let ancestor = state
        .store
        .with_live(&[a, b], |index| analysis::common_ancestor(index, a, b))?;
    Ok(Json(DataResponse { data: ancestor }))
}

/// GET /hierarchy/statistics?root=X
///
/// Statistics for one subtree, or the whole forest when `root` is omitted.
pub async fn statistics(
    State(state): State<AppState>,
    Query(params): Query<StatisticsParams>,
) -> AppResult<impl IntoResponse> {
    let root = params.root;
    let stats = state.store.with_live(root.as_slice(), |index| {
        analysis::hierarchy_statistics(index, root)
    })?;
    Ok(Json(DataResponse { data: stats }))
}
