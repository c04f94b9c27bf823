//! HTTP-level integration tests for topic records, versions, moves and
//! role enforcement.
//!
//! Uses tower::ServiceExt to send requests directly to the router without a
//! TCP listener.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{body_json, create_topic, delete, get, post_json, put_json, send};
use serde_json::json;
use topichub_db::MemoryRepository;

// ---------------------------------------------------------------------------
// Create / get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_topic_returns_201() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/topics",
        json!({"name": "Root", "content": "r-content"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Root");
    assert_eq!(json["data"]["version"], 1);
    assert!(json["data"]["parent_id"].is_null());
    assert!(json["data"]["id"].is_string());
}

#[tokio::test]
async fn get_topic_includes_children() {
    let app = common::build_test_app();
    let root = create_topic(&app, "Root", "r", None).await;
    let child = create_topic(&app, "Child", "c", Some(&root)).await;

    let response = get(app, &format!("/api/v1/topics/{root}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["child_ids"], json!([child]));
}

#[tokio::test]
async fn get_unknown_topic_returns_404() {
    let app = common::build_test_app();
    let response = get(app, &format!("/api/v1/topics/{}", uuid::Uuid::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_id_returns_400() {
    let app = common::build_test_app();
    let response = get(app, "/api/v1/topics/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_with_unknown_parent_returns_404() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/api/v1/topics",
        json!({"name": "Orphan", "content": "c", "parent_id": uuid::Uuid::new_v4()}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_with_empty_fields_returns_400() {
    let app = common::build_test_app();
    let response = post_json(app, "/api/v1/topics", json!({"name": " ", "content": ""})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("Name must not be empty"));
    assert!(message.contains("Content must not be empty"));
}

#[tokio::test]
async fn list_topics_and_roots() {
    let app = common::build_test_app();
    let root = create_topic(&app, "Root", "r", None).await;
    create_topic(&app, "Child", "c", Some(&root)).await;
    create_topic(&app, "Other", "o", None).await;

    let all = body_json(get(app.clone(), "/api/v1/topics").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 3);

    let roots = body_json(get(app.clone(), "/api/v1/topics?roots_only=true").await).await;
    assert_eq!(roots["data"].as_array().unwrap().len(), 2);

    let children = body_json(get(app, &format!("/api/v1/topics/{root}/children")).await).await;
    assert_eq!(children["data"][0]["name"], "Child");
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_creates_new_version_and_history() {
    let app = common::build_test_app();
    let id = create_topic(&app, "T", "v1 content", None).await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/topics/{id}"),
        json!({"content": "v2 content"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["version"], 2);
    assert_eq!(json["data"]["name"], "T");

    let history = body_json(get(app.clone(), &format!("/api/v1/topics/{id}/history")).await).await;
    let versions: Vec<_> = history["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version"].as_u64().unwrap())
        .collect();
    assert_eq!(versions, vec![2, 1]);

    let v1 = body_json(get(app, &format!("/api/v1/topics/{id}/versions/1")).await).await;
    assert_eq!(v1["data"]["content"], "v1 content");
}

#[tokio::test]
async fn missing_version_returns_404() {
    let app = common::build_test_app();
    let id = create_topic(&app, "T", "v1", None).await;

    let response = get(app, &format!("/api/v1/topics/{id}/versions/5")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "VERSION_NOT_FOUND");
}

#[tokio::test]
async fn diff_between_versions() {
    let app = common::build_test_app();
    let id = create_topic(&app, "T", "intro\nold line", None).await;
    put_json(
        app.clone(),
        &format!("/api/v1/topics/{id}"),
        json!({"content": "intro\nnew line"}),
    )
    .await;

    let response = get(app, &format!("/api/v1/topics/{id}/diff?from=1&to=2")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let lines = json["data"]["lines"].as_array().unwrap();
    assert_eq!(lines[0]["line_type"], "unchanged");
    assert!(lines.iter().any(|l| l["line_type"] == "removed" && l["content"] == "old line"));
    assert!(lines.iter().any(|l| l["line_type"] == "added" && l["content"] == "new line"));
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

#[tokio::test]
async fn move_topic_keeps_version() {
    let app = common::build_test_app();
    let p = create_topic(&app, "P", "p", None).await;
    let q = create_topic(&app, "Q", "q", None).await;
    let c = create_topic(&app, "C", "c", Some(&p)).await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/topics/{c}/parent"),
        json!({"parent_id": q}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["parent_id"], json!(q));
    assert_eq!(json["data"]["version"], 1);

    let old_parent = body_json(get(app, &format!("/api/v1/topics/{p}")).await).await;
    assert_eq!(old_parent["data"]["child_ids"], json!([]));
}

#[tokio::test]
async fn move_into_descendant_returns_409() {
    let app = common::build_test_app();
    let r = create_topic(&app, "R", "r", None).await;
    let a = create_topic(&app, "A", "a", Some(&r)).await;
    let b = create_topic(&app, "B", "b", Some(&a)).await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/topics/{r}/parent"),
        json!({"parent_id": b}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CIRCULAR_REFERENCE");

    let root = body_json(get(app, &format!("/api/v1/topics/{r}")).await).await;
    assert!(root["data"]["parent_id"].is_null());
}

#[tokio::test]
async fn move_to_root_with_null_parent() {
    let app = common::build_test_app();
    let p = create_topic(&app, "P", "p", None).await;
    let c = create_topic(&app, "C", "c", Some(&p)).await;

    let response = put_json(
        app,
        &format!("/api/v1/topics/{c}/parent"),
        json!({"parent_id": null}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["parent_id"].is_null());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_with_children_returns_409() {
    let app = common::build_test_app();
    let p = create_topic(&app, "P", "p", None).await;
    create_topic(&app, "C", "c", Some(&p)).await;

    let response = delete(app, &format!("/api/v1/topics/{p}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "HAS_CHILDREN");
}

#[tokio::test]
async fn delete_leaf_removes_history() {
    let app = common::build_test_app();
    let id = create_topic(&app, "Leaf", "l", None).await;

    let response = delete(app.clone(), &format!("/api/v1/topics/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.clone(), &format!("/api/v1/topics/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = get(app, &format!("/api/v1/topics/{id}/history")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_returns_404() {
    let app = common::build_test_app();
    let response = delete(app, &format!("/api/v1/topics/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_editor_cannot_delete() {
    let app = common::build_test_app();
    let id = create_topic(&app, "Leaf", "l", None).await;

    let response = send(app, Method::DELETE, &format!("/api/v1/topics/{id}"), None, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn viewer_cannot_create() {
    let app = common::build_test_app();
    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/topics",
        Some(json!({"name": "N", "content": "c"})),
        Some("viewer"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let all = body_json(get(app, "/api/v1/topics").await).await;
    assert!(all["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_role_returns_400() {
    let app = common::build_test_app();
    let response = send(
        app,
        Method::POST,
        "/api/v1/topics",
        Some(json!({"name": "N", "content": "c"})),
        Some("owner"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn traverse_breadth_first() {
    let app = common::build_test_app();
    let r = create_topic(&app, "R", "r", None).await;
    let a = create_topic(&app, "A", "a", Some(&r)).await;
    create_topic(&app, "A1", "a1", Some(&a)).await;
    create_topic(&app, "B", "b", Some(&r)).await;

    let json = body_json(get(app, &format!("/api/v1/topics/{r}/traverse?method=bfs")).await).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["R", "A", "B", "A1"]);
}

#[tokio::test]
async fn traverse_unknown_method_returns_400() {
    let app = common::build_test_app();
    let r = create_topic(&app, "R", "r", None).await;

    let response = get(app, &format!("/api/v1/topics/{r}/traverse?method=sideways")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn depth_statistics_and_neighborhood() {
    let app = common::build_test_app();
    let r = create_topic(&app, "R", "r", None).await;
    let a = create_topic(&app, "A", "a", Some(&r)).await;
    let b = create_topic(&app, "B", "b", Some(&a)).await;

    let depth = body_json(get(app.clone(), &format!("/api/v1/topics/{a}/depth")).await).await;
    assert_eq!(depth["data"]["height"], 1);
    assert_eq!(depth["data"]["depth"], 1);

    let stats = body_json(get(app.clone(), &format!("/api/v1/topics/{r}/statistics")).await).await;
    assert_eq!(stats["data"]["total_nodes"], 3);
    assert_eq!(stats["data"]["max_depth"], 2);
    assert_eq!(stats["data"]["leaf_count"], 1);

    let ancestors = body_json(get(app.clone(), &format!("/api/v1/topics/{b}/ancestors")).await).await;
    assert_eq!(ancestors["data"][0]["name"], "A");
    assert_eq!(ancestors["data"][1]["name"], "R");

    let descendants =
        body_json(get(app.clone(), &format!("/api/v1/topics/{r}/descendants")).await).await;
    assert_eq!(descendants["data"].as_array().unwrap().len(), 2);

    let within = body_json(get(app, &format!("/api/v1/topics/{a}/within?distance=1")).await).await;
    let within = within["data"].as_array().unwrap();
    assert_eq!(within.len(), 3);
    assert_eq!(within[0]["distance"], 0);
    assert_eq!(within[0]["topic"]["name"], "A");
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mutations_are_saved_to_the_repository() {
    let repo = Arc::new(MemoryRepository::new());
    let app = common::build_test_app_with(Arc::clone(&repo));

    let id = create_topic(&app, "Saved", "v1", None).await;
    put_json(app, &format!("/api/v1/topics/{id}"), json!({"content": "v2"})).await;

    let snapshot = repo.current().await;
    assert_eq!(snapshot.topics.len(), 1);
    assert_eq!(snapshot.topics[0].version, 2);
    assert_eq!(snapshot.versions.len(), 2);
}
