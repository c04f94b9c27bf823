#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use topichub_api::config::ServerConfig;
use topichub_api::middleware::role::ROLE_HEADER;
use topichub_api::router::build_app_router;
use topichub_api::state::AppState;
use topichub_core::roles::Role;
use topichub_core::TopicStore;
use topichub_db::MemoryRepository;
use topichub_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin and `editor` as the default
/// role, matching the dev defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        data_file: PathBuf::from("unused.json"),
        default_role: Role::Editor,
        log_json: false,
    }
}

/// Build the full application router over an empty in-memory store.
pub fn build_test_app() -> Router {
    build_test_app_with(Arc::new(MemoryRepository::new()))
}

/// Build the full application router saving into `repo`.
pub fn build_test_app_with(repo: Arc<MemoryRepository>) -> Router {
    let config = test_config();
    let state = AppState::new(
        Arc::new(TopicStore::new()),
        repo,
        Arc::new(EventBus::default()),
        Arc::new(config.clone()),
    );
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request, optionally with a JSON body and a role header.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    role: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header(ROLE_HEADER, role);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), None).await
}

/// DELETE as `admin`, the only role allowed to delete.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some("admin")).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a topic and return its id.
pub async fn create_topic(app: &Router, name: &str, content: &str, parent: Option<&str>) -> String {
    let response = post_json(
        app.clone(),
        "/api/v1/topics",
        serde_json::json!({"name": name, "content": content, "parent_id": parent}),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}
