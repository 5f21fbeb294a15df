use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use users_service::{app, connect, AppState, StoreConfig, User, UserStore};

async fn test_server_with_limit(body_limit: usize) -> (TestServer, Arc<dyn UserStore>) {
    let store = connect(&StoreConfig::new("sqlite::memory:")).await.unwrap();
    store.ensure_schema().await.unwrap();
    let server = TestServer::new(app(AppState::new(store.clone()), body_limit)).unwrap();
    (server, store)
}

async fn test_server() -> (TestServer, Arc<dyn UserStore>) {
    test_server_with_limit(64 * 1024).await
}

#[tokio::test]
async fn test_list_empty_store() {
    let (server, _store) = test_server().await;

    let response = server.get("/users").await;

    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn test_create_then_list() {
    let (server, _store) = test_server().await;

    let response = server.post("/users").json(&json!({"name": "Alice"})).await;

    response.assert_status(StatusCode::CREATED);
    response.assert_json(&json!({"id": 1, "name": "Alice"}));
    assert_eq!(response.header("location"), "/users/1");

    let response = server.get("/users").await;
    response.assert_status_ok();
    response.assert_json(&json!([{"id": 1, "name": "Alice"}]));
}

#[tokio::test]
async fn test_each_created_name_listed_once() {
    let (server, _store) = test_server().await;
    let names = ["Alice", "Zoë", "", "O'Brien", "名前"];

    for name in names {
        server
            .post("/users")
            .json(&json!({ "name": name }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let users: Vec<User> = server.get("/users").await.json();
    assert_eq!(users.len(), names.len());
    for name in names {
        assert_eq!(users.iter().filter(|u| u.name == name).count(), 1, "{name:?}");
    }
}

#[tokio::test]
async fn test_duplicate_names_get_distinct_ids() {
    let (server, _store) = test_server().await;

    let first: User = server.post("/users").json(&json!({"name": "Bob"})).await.json();
    let second: User = server.post("/users").json(&json!({"name": "Bob"})).await.json();

    assert_ne!(first.id, second.id);
    let users: Vec<User> = server.get("/users").await.json();
    assert_eq!(users, vec![first, second]);
}

#[tokio::test]
async fn test_missing_name_is_rejected() {
    let (server, _store) = test_server().await;

    for body in [json!({}), json!({"name": null}), json!({"name": 7})] {
        let response = server.post("/users").json(&body).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "validation_error");
    }

    server.get("/users").await.assert_json(&json!([]));
}

#[tokio::test]
async fn test_non_object_body_is_bad_request() {
    let (server, _store) = test_server().await;

    let response = server.post("/users").json(&json!(["Alice"])).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (server, _store) = test_server_with_limit(256).await;

    let response = server
        .post("/users")
        .json(&json!({"name": "x".repeat(1024)}))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "payload_too_large");
    server.get("/users").await.assert_json(&json!([]));
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let (server, _store) = test_server().await;

    let response = server
        .post("/users")
        .bytes(Bytes::from_static(b"{\"name\": "))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
    server.get("/users").await.assert_json(&json!([]));
}

#[tokio::test]
async fn test_non_json_content_type_uses_error_envelope() {
    let (server, _store) = test_server().await;

    let response = server.post("/users").text("name=Alice").await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "unsupported_media_type");
}

#[tokio::test]
async fn test_wrong_method_uses_error_envelope() {
    let (server, _store) = test_server().await;

    let response = server.delete("/users").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "method_not_allowed");
    assert_eq!(body["error"]["message"], "method not allowed: DELETE /users");

    let response = server.post("/health").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "method_not_allowed");
}

#[tokio::test]
async fn test_store_unavailable() {
    let (server, store) = test_server().await;
    store.close().await;

    let response = server.get("/users").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "storage_unavailable");

    let response = server.post("/users").json(&json!({"name": "Alice"})).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let response = server.get("/ready").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    response.assert_json(&json!({"status": "degraded", "database": "unavailable"}));
}

#[tokio::test]
async fn test_common_routes() {
    let (server, _store) = test_server().await;

    server.get("/health").await.assert_json(&json!({"status": "ok"}));
    server
        .get("/ready")
        .await
        .assert_json(&json!({"status": "ok", "database": "ok"}));

    server.get("/version").await.assert_json(&json!({
        "name": "users-service",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": "sqlite",
        "table": "users"
    }));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (server, _store) = test_server().await;

    let response = server.get("/users/1").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let (server, _store) = test_server().await;

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("abc-123"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "abc-123");
}

#[tokio::test]
async fn test_schema_setup_twice_keeps_rows() {
    let (server, store) = test_server().await;
    server
        .post("/users")
        .json(&json!({"name": "Alice"}))
        .await
        .assert_status(StatusCode::CREATED);

    store.ensure_schema().await.unwrap();

    server
        .get("/users")
        .await
        .assert_json(&json!([{"id": 1, "name": "Alice"}]));
}
