use crate::*;
use proptest::prelude::*;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use diesel::RunQueryDsl;
use serde_json::Value;
use tower::ServiceExt;

use crate::repo::tests::setup_test_db;

pub const TEST_SECRET: &str = "test-secret";

/// Application state over a fresh in-memory database
pub fn test_state() -> AppState {
    AppState::new(setup_test_db(), auth::TokenKeys::new(TEST_SECRET, 72))
}

/// Sends one request through the full router and decodes the JSON answer
///
/// ### Arguments
///
/// * `app` - The router to call
/// * `method` - HTTP method
/// * `uri` - Request path and query
/// * `token` - Optional login token, sent as `Authorization: Token …`
/// * `body` - Optional JSON body
pub async fn send(
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


use diesel::sql_types::Text;
use diesel::QueryableByName;

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Checks that migrations created every table and the app answers on them
#[tokio::test]
async fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "users", "follows", "item_users", "items", "tags", "item_tags", "favorites", "comments",
        "__diesel_schema_migrations" // Diesel's migration tracking table
    ];

    for table in expected_tables {
        let exists = table_names.iter().any(|t| t.name == table);
        assert!(exists, "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }

    drop(conn);

    let app = create_app(AppState::new(pool, auth::TokenKeys::new(TEST_SECRET, 72)));
    let (status, body) = send(&app, "GET", "/api/tags", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "tags": [] }));
}

/// Foreign keys are enforced on every pooled connection
#[test]
fn test_foreign_keys_enforced() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();
    let result = diesel::sql_query("INSERT INTO item_users (user_id, created_at, updated_at) VALUES (999, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)")
        .execute(&mut conn);
    assert!(result.is_err());
}


/// Generates an arbitrary DateTime<Utc> within 2020-01-01 to 2030-01-01,
/// with millisecond precision
pub fn arb_datetime_utc() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800_000i64..1_893_456_000_000i64)
        .prop_map(|ms| DateTime::from_timestamp_millis(ms).unwrap())
}

/// Generates a username that passes registration rules
pub fn arb_username() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{4,32}"
}

/// Generates a well-formed email address
pub fn arb_email() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}@[a-z]{1,12}\\.[a-z]{2,4}"
}

/// Generates a password that passes registration rules
pub fn arb_password() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!#%&*]{8,64}"
}

/// Generates an item title of at least four characters
pub fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ,.!?'-]{3,60}"
}

/// Generates strings with whitespace, unicode and punctuation mixed in
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \\t]{0,3}[a-zA-Z0-9]{0,10}[ \\t]{0,3}",
        "\\PC{0,24}",
        "[-_.!@#/ ]{0,8}",
    ]
}
