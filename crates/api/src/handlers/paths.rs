//! Handlers for path queries between two topics.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use topichub_core::analysis::UNRELATED_DISTANCE;
use topichub_core::path::{self, clamp_path_limit};
use topichub_core::topic::Topic;
use topichub_core::types::TopicId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PathParams {
    pub from: TopicId,
    pub to: TopicId,
}

#[derive(Debug, Deserialize)]
pub struct AllPathsParams {
    pub from: TopicId,
    pub to: TopicId,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ShortestPathResponse {
    /// `null` when the topics are in different trees.
    pub path: Option<Vec<Topic>>,
    /// Edges on the path, `-1` when there is none.
    pub distance: i64,
}

#[derive(Debug, Serialize)]
pub struct AllPathsResponse {
    pub paths: Vec<Vec<Topic>>,
    pub count: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub from: TopicId,
    pub to: TopicId,
    pub distance: i64,
}

fn to_distance(edges: Option<usize>) -> i64 {
    edges.map_or(UNRELATED_DISTANCE, |d| d as i64)
}

/// GET /paths/shortest?from=A&to=B
pub async fn shortest_path(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> AppResult<impl IntoResponse> {
    let (from, to) = (params.from, params.to);
    let path = state
        .store
        .with_live(&[from, to], |index| path::shortest_path(index, from, to))?;
    let distance = to_distance(path.as_ref().map(|p| p.len() - 1));
    Ok(Json(DataResponse {
        data: ShortestPathResponse { path, distance },
    }))
}

/// GET /paths/all?from=A&to=B&limit=N
///
/// Every simple path, up to `limit` (default 100, at most 1000).
pub async fn all_paths(
    State(state): State<AppState>,
    Query(params): Query<AllPathsParams>,
) -> AppResult<impl IntoResponse> {
    let (from, to) = (params.from, params.to);
    let limit = clamp_path_limit(params.limit);
    let paths = state
        .store
        .with_live(&[from, to], |index| path::all_paths(index, from, to, limit))?;
    Ok(Json(DataResponse {
        data: AllPathsResponse {
            count: paths.len(),
            paths,
            limit,
        },
    }))
}

/// GET /paths/distance?from=A&to=B
pub async fn path_distance(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> AppResult<impl IntoResponse> {
    let (from, to) = (params.from, params.to);
    let edges = state
        .store
        .with_live(&[from, to], |index| path::path_distance(index, from, to))?;
    Ok(Json(DataResponse {
        data: DistanceResponse {
            from,
            to,
            distance: to_distance(edges),
        },
    }))
}
