pub mod health;
pub mod hierarchy;
pub mod paths;
pub mod search;
pub mod topics;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /topics                                 list, create
/// /topics/{id}                            get, new version, delete
/// /topics/{id}/parent                     move (PUT)
/// /topics/{id}/children                   direct children
/// /topics/{id}/history                    versions, newest first
/// /topics/{id}/versions/{version}         one version
/// /topics/{id}/diff                       diff two versions
/// /topics/{id}/traverse                   subtree walk
/// /topics/{id}/statistics                 subtree statistics
/// /topics/{id}/depth                      height and depth
/// /topics/{id}/ancestors                  ancestors
/// /topics/{id}/descendants                descendants
/// /topics/{id}/within                     neighborhood
///
/// /paths/shortest                         shortest path
/// /paths/all                              all simple paths
/// /paths/distance                         path distance
///
/// /hierarchy/relationship                 relationship of two topics
/// /hierarchy/common-ancestor              lowest common ancestor
/// /hierarchy/statistics                   forest or subtree statistics
///
/// /search                                 relevance search
/// /search/fuzzy                           fuzzy search
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/topics", topics::router())
        .nest("/paths", paths::router())
        .nest("/hierarchy", hierarchy::router())
        .nest("/search", search::router())
}
