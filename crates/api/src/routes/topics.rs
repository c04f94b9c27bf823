//! Route definitions for topic records.
//!
//! Registered under `/topics`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::topics;
use crate::state::AppState;

/// Topic routes, registered as `/topics`.
///
/// ```text
/// GET    /                              list_topics
/// POST   /                              create_topic
/// GET    /{id}                          get_topic
/// PUT    /{id}                          update_topic
/// DELETE /{id}                          delete_topic
/// PUT    /{id}/parent                   move_topic
/// GET    /{id}/children                 list_children
/// GET    /{id}/history                  list_history
/// GET    /{id}/versions/{version}       get_version
/// GET    /{id}/diff                     diff_versions
/// GET    /{id}/traverse                 traverse_topic
/// GET    /{id}/statistics               topic_statistics
/// GET    /{id}/depth                    topic_depth
/// GET    /{id}/ancestors                list_ancestors
/// GET    /{id}/descendants              list_descendants
/// GET    /{id}/within                   topics_within
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(topics::list_topics).post(topics::create_topic))
        .route(
            "/{id}",
            get(topics::get_topic)
                .put(topics::update_topic)
                .delete(topics::delete_topic),
        )
        .route("/{id}/parent", put(topics::move_topic))
        .route("/{id}/children", get(topics::list_children))
        .route("/{id}/history", get(topics::list_history))
        .route("/{id}/versions/{version}", get(topics::get_version))
        .route("/{id}/diff", get(topics::diff_versions))
        .route("/{id}/traverse", get(topics::traverse_topic))
        .route("/{id}/statistics", get(topics::topic_statistics))
        .route("/{id}/depth", get(topics::topic_depth))
        .route("/{id}/ancestors", get(topics::list_ancestors))
        .route("/{id}/descendants", get(topics::list_descendants))
        .route("/{id}/within", get(topics::topics_within))
}
