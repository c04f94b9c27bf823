//! Route definitions for path queries.
//!
//! Registered under `/paths`.

use axum::routing::get;
use axum::Router;

use crate::handlers::paths;
use crate::state::AppState;

/// ```text
/// GET    /shortest?from=&to=            shortest_path
/// GET    /all?from=&to=&limit=          all_paths
/// GET    /distance?from=&to=            path_distance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shortest", get(paths::shortest_path))
        .route("/all", get(paths::all_paths))
        .route("/distance", get(paths::path_distance))
}
