//! Common test utilities for Bazaar integration tests
//!
//! This file contains shared functions and utilities for all integration tests,
//! including test application setup and helpers for the requests most tests
//! need (registering a user, publishing an item).

#![allow(dead_code)]

use bazaar::{
    auth::TokenKeys,
    create_app,
    db::init_pool,
    AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Creates a test application with an in-memory SQLite database
///
/// This helper function:
/// 1. Creates a uniquely named shared in-memory SQLite database
/// 2. Runs migrations to set up the schema
/// 3. Creates an Axum application with the database
///
/// Using an in-memory database ensures that:
/// - Tests run quickly
/// - Tests are isolated from each other
/// - No cleanup is needed after tests
///
/// ### Returns
///
/// An Axum Router configured with all routes and connected to an in-memory database
pub fn create_test_app() -> Router {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());

    let conn = &mut pool.get().unwrap();
    bazaar::run_migrations(conn).unwrap();

    create_app(AppState::new(pool.clone(), TokenKeys::new(TEST_SECRET, 72)))
}

/// Sends a request and returns the status with the decoded JSON body
///
/// ### Arguments
///
/// * `app` - The test application
/// * `method` - HTTP method
/// * `uri` - Path and query
/// * `token` - Optional token, sent as `Authorization: Token …`
/// * `body` - Optional JSON body
///
/// ### Returns
///
/// The status code and the JSON body (`Value::Null` when empty)
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Token {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_raw(app, request).await
}

/// Sends a prepared request; for bodies or headers `request` can't express
pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Registers a user named `username` with password `password123`
///
/// ### Returns
///
/// The login token of the new user
pub async fn register_user(app: &Router, username: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "user": {
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

    body["user"]["token"].as_str().unwrap().to_string()
}

/// Publishes an item and returns its JSON representation
pub async fn create_item(app: &Router, token: &str, title: &str, tags: &[&str]) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/items",
        Some(token),
        Some(json!({
            "item": {
                "title": title,
                "description": format!("About {}", title),
                "body": "Details to follow",
                "tagList": tags
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "item creation failed: {}", body);

    body["item"].clone()
}
