#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vinco_api::auth::jwt::{generate_access_token, JwtConfig};
use vinco_api::config::{LogFormat, QueueConfig, ServerConfig};
use vinco_api::router::build_app_router;
use vinco_api::state::AppState;
use vinco_core::store::MemoryStore;
use vinco_events::EventBus;

pub const EDITOR_ID: i64 = 10;
pub const OTHER_EDITOR_ID: i64 = 11;
pub const VIEWER_ID: i64 = 20;

/// Build a test `ServerConfig` with safe defaults and no database.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        db_max_connections: 5,
        log_format: LogFormat::Pretty,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        queue: QueueConfig::default(),
    }
}

/// Application state on a fresh in-memory store.
pub fn test_state() -> AppState {
    AppState::new(
        test_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(EventBus::default()),
        None,
    )
    .unwrap()
}

/// The full router, with the production middleware stack, on a fresh
/// in-memory store.
pub fn build_test_app() -> Router {
    build_app_router(test_state(), &test_config())
}

/// A bearer token for `user_id` with `role`.
pub fn token(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

pub fn editor_token() -> String {
    token(EDITOR_ID, "editor")
}

pub fn other_editor_token() -> String {
    token(OTHER_EDITOR_ID, "editor")
}

pub fn viewer_token() -> String {
    token(VIEWER_ID, "viewer")
}

/// Send a request through the router. `token` becomes a Bearer header.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A detection body for `POST /recognition/candidates`.
pub fn detection(image_id: i64, athlete_id: i64, confidence: f64, minute: u32) -> serde_json::Value {
    serde_json::json!({
        "image_id": image_id,
        "athlete_id": athlete_id,
        "confidence": confidence,
        "bounding_box": { "left": 0.1, "top": 0.1, "width": 0.3, "height": 0.3 },
        "captured_at": format!("2026-03-01T12:{minute:02}:00Z"),
    })
}

/// Ingest a detection that lands in the review queue and return its id.
pub async fn ingest_pending(app: &Router, image_id: i64, athlete_id: i64, minute: u32) -> i64 {
    let response = post_json(
        app,
        "/api/v1/recognition/candidates",
        &editor_token(),
        detection(image_id, athlete_id, 0.7, minute),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["candidate"]["status"], "PENDING_REVIEW");
    json["data"]["candidate"]["id"].as_i64().unwrap()
}
