//! Route definitions for hierarchy analysis.
//!
//! Registered under `/hierarchy`.

use axum::routing::get;
use axum::Router;

use crate::handlers::hierarchy;
use crate::state::AppState;

/// ```text
/// GET    /relationship?a=&b=            relationship
/// GET    /common-ancestor?a=&b=         common_ancestor
/// GET    /statistics?root=              statistics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/relationship", get(hierarchy::relationship))
        .route("/common-ancestor", get(hierarchy::common_ancestor))
        .route("/statistics", get(hierarchy::statistics))
}
