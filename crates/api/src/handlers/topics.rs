//! Handlers for topic records: CRUD, moves, version history, traversal and
//! per-topic neighborhood queries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use topichub_core::analysis;
use topichub_core::diff::DiffLine;
use topichub_core::error::CoreError;
use topichub_core::path;
use topichub_core::roles::Capability;
use topichub_core::topic::{NewTopic, TopicUpdate};
use topichub_core::traversal::{self, TraversalMethod};
use topichub_core::types::{TopicId, Version};

use crate::error::{AppError, AppResult};
use crate::middleware::role::Caller;
use crate::response::DataResponse;
use crate::state::AppState;

/// Neighborhood radius used when `distance` is omitted.
const DEFAULT_NEIGHBORHOOD_DISTANCE: usize = 1;

/* --------------------------------------------------------------------------
Request and response types
-------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct ListTopicsParams {
    pub roots_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTopicRequest {
    /// New parent, or `null` to make the topic a root.
    pub parent_id: Option<TopicId>,
}

#[derive(Debug, Deserialize)]
pub struct DiffParams {
    pub from: Version,
    pub to: Version,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub topic_id: TopicId,
    pub from: Version,
    pub to: Version,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Deserialize)]
pub struct TraverseParams {
    pub method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepthResponse {
    pub topic_id: TopicId,
    /// Edges down to the deepest leaf.
    pub height: usize,
    /// Edges up to the root.
    pub depth: usize,
}

#[derive(Debug, Deserialize)]
pub struct WithinParams {
    pub distance: Option<usize>,
}


/* --------------------------------------------------------------------------
CRUD
-------------------------------------------------------------------------- */

/// GET /topics
///
/// List live topics, or only the roots with `?roots_only=true`.
pub async fn list_topics(
    State(state): State<AppState>,
    Query(params): Query<ListTopicsParams>,
) -> AppResult<impl IntoResponse> {
    let topics = if params.roots_only.unwrap_or(false) {
        state.store.roots()
    } else {
        state.store.list()
    };
    Ok(Json(DataResponse { data: topics }))
}

/// POST /topics
pub async fn create_topic(
    caller: Caller,
    State(state): State<AppState>,
    Json(input): Json<NewTopic>,
) -> AppResult<impl IntoResponse> {
    caller.require(Capability::Create)?;

    let committed = state.store.create(input)?;
    let topic = state.commit(committed).await?;

    tracing::info!(
        topic_id = %topic.id,
        parent_id = ?topic.parent_id,
        role = %caller.role,
        "Topic created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: topic })))
}

/// GET /topics/{id}
pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    let topic = state.store.require(id)?;
    Ok(Json(DataResponse { data: topic }))
}

/// PUT /topics/{id}
///
/// Append a new version with the supplied name and/or content.
pub async fn update_topic(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
    Json(input): Json<TopicUpdate>,
) -> AppResult<impl IntoResponse> {
    caller.require(Capability::Update)?;

    let committed = state.store.create_new_version(id, input)?;
    let topic = state.commit(committed).await?;

    tracing::info!(
        topic_id = %id,
        version = topic.version,
        role = %caller.role,
        "Topic version created"
    );

    Ok(Json(DataResponse { data: topic }))
}

/// DELETE /topics/{id}
///
/// Delete a leaf topic and its whole history.
pub async fn delete_topic(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    caller.require(Capability::Delete)?;

    let committed = state.store.delete(id)?;
    if !state.commit(committed).await? {
        return Err(AppError::Core(CoreError::topic_not_found(id)));
    }

    tracing::info!(topic_id = %id, role = %caller.role, "Topic deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /topics/{id}/parent
///
/// Move a topic under a new parent, or to the root level with `null`.
pub async fn move_topic(
    caller: Caller,
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
    Json(input): Json<MoveTopicRequest>,
) -> AppResult<impl IntoResponse> {
    caller.require(Capability::Move)?;

    let committed = state.store.move_topic(id, input.parent_id)?;
    let topic = state.commit(committed).await?;

    tracing::info!(
        topic_id = %id,
        parent_id = ?topic.parent_id,
        role = %caller.role,
        "Topic moved"
    );

    Ok(Json(DataResponse { data: topic }))
}

/// GET /topics/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    let children = state.store.children(id)?;
    Ok(Json(DataResponse { data: children }))
}

/* --------------------------------------------------------------------------
Versions
-------------------------------------------------------------------------- */

/// GET /topics/{id}/history
///
/// All versions, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    let versions = state.store.history(id)?;
    Ok(Json(DataResponse { data: versions }))
}

/// GET /topics/{id}/versions/{version}
pub async fn get_version(
    State(state): State<AppState>,
    Path((id, version)): Path<(TopicId, Version)>,
) -> AppResult<impl IntoResponse> {
    let topic = state.store.get_version(id, version)?;
    Ok(Json(DataResponse { data: topic }))
}

/// GET /topics/{id}/diff?from=X&to=Y
///
/// Line-level diff of the content of two versions.
pub async fn diff_versions(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
    Query(params): Query<DiffParams>,
) -> AppResult<impl IntoResponse> {
    let lines = state.store.diff_versions(id, params.from, params.to)?;
    let response = DiffResponse {
        topic_id: id,
        from: params.from,
        to: params.to,
        lines,
    };
    Ok(Json(DataResponse { data: response }))
}

/* --------------------------------------------------------------------------
Traversal
-------------------------------------------------------------------------- */

/// GET /topics/{id}/traverse?method=depth-first
///
/// Walk the subtree rooted at `id`. Defaults to depth-first.
pub async fn traverse_topic(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
    Query(params): Query<TraverseParams>,
) -> AppResult<impl IntoResponse> {
    let method = match params.method.as_deref() {
        Some(m) => m.parse::<TraversalMethod>()?,
        None => TraversalMethod::DepthFirst,
    };
    let topics = state
        .store
        .with_live(&[id], |index| traversal::traverse(index, id, method))?;
    Ok(Json(DataResponse { data: topics }))
}

/// GET /topics/{id}/statistics
pub async fn topic_statistics(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    let stats = state
        .store
        .with_live(&[id], |index| traversal::statistics(index, id))?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /topics/{id}/depth
pub async fn topic_depth(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    let measured = state.store.with_live(&[id], |index| {
        traversal::subtree_height(index, id).zip(traversal::depth_from_root(index, id))
    })?;
    let (height, depth) =
        measured.ok_or_else(|| AppError::Core(CoreError::topic_not_found(id)))?;
    Ok(Json(DataResponse {
        data: DepthResponse {
            topic_id: id,
            height,
            depth,
        },
    }))
}

/* --------------------------------------------------------------------------
Neighborhood
-------------------------------------------------------------------------- */

/// GET /topics/{id}/ancestors
///
/// Nearest parent first.
pub async fn list_ancestors(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    let ancestors = state
        .store
        .with_live(&[id], |index| analysis::ancestors(index, id))?;
    Ok(Json(DataResponse { data: ancestors }))
}

/// GET /topics/{id}/descendants
pub async fn list_descendants(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
) -> AppResult<impl IntoResponse> {
    let descendants = state
        .store
        .with_live(&[id], |index| analysis::descendants(index, id))?;
    Ok(Json(DataResponse { data: descendants }))
}

/// GET /topics/{id}/within?distance=N
///
/// Topics reachable within `N` edges, nearest first.
pub async fn topics_within(
    State(state): State<AppState>,
    Path(id): Path<TopicId>,
    Query(params): Query<WithinParams>,
) -> AppResult<impl IntoResponse> {
    let distance = params.distance.unwrap_or(DEFAULT_NEIGHBORHOOD_DISTANCE);
    let nearby = state.store.with_live(&[id], |index| {
        path::topics_within_distance(index, id, distance)
    })?;
    Ok(Json(DataResponse { data: nearby }))
}
