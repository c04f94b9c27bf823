//! Route definitions for topic search.
//!
//! Registered under `/search`.

use axum::routing::get;
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// ```text
/// GET    /?q=&limit=                    search_topics
/// GET    /fuzzy?q=&threshold=&limit=    fuzzy_search_topics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search::search_topics))
        .route("/fuzzy", get(search::fuzzy_search_topics))
}
