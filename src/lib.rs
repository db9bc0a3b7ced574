/// Bazaar: a marketplace REST backend
///
/// Users register and log in, follow each other, list items for sale, tag
/// them, comment on them and favorite them. Everything is exposed as a JSON
/// API under `/api` and persisted in SQLite.
///
/// ### Modules
///
/// - `auth`: Password hashing, tokens and caller extraction
/// - `config`: Layered configuration
/// - `db`: Database connection management
/// - `models`: Diesel entities
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
/// - `validators`: Request bodies and their validation
/// - `serializers`: Response bodies
/// - `handlers`: One function per endpoint
///
/// ### Web API
///
/// - `POST /api/users`, `POST /api/users/login`: Register and log in
/// - `GET /api/user`, `PUT /api/user`: The current user
/// - `GET /api/profiles/{username}`, `POST|DELETE /api/profiles/{username}/follow`
/// - `GET|POST /api/items`, `GET /api/items/feed`
/// - `GET|PUT|DELETE /api/items/{slug}`, `POST|DELETE /api/items/{slug}/favorite`
/// - `GET|POST /api/items/{slug}/comments`, `DELETE /api/items/{slug}/comments/{id}`
/// - `GET /api/tags`, `GET /api/ping`

/// Authentication module
pub mod auth;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Error handling module
pub mod errors;

/// Web API handlers module
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Response bodies
pub mod serializers;

/// Request bodies and validation
pub mod validators;

#[cfg(test)]
mod test_utils;

use axum::{
    middleware,
    routing::{delete, get, post},
    Json,
    Router,
};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::TokenKeys;
use crate::db::DbPool;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(pool: Arc<DbPool>, tokens: TokenKeys) -> Self {
        Self {
            pool,
            tokens: Arc::new(tokens),
        }
    }
}

/// Liveness probe
async fn ping_handler() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// Creates the application router with all routes
///
/// Every request first passes through [`auth::authenticate`], which records
/// the caller; handlers decide whether a login is required.
///
/// ### Arguments
///
/// * `state` - The database pool and token keys
///
/// ### Returns
///
/// An Axum Router configured with all routes
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(ping_handler))
        .route("/users", post(handlers::register_handler))
        .route("/users/login", post(handlers::login_handler))
        .route("/user", get(handlers::current_user_handler).put(handlers::update_user_handler))
        .route("/profiles/{username}", get(handlers::get_profile_handler))
        .route(
            "/profiles/{username}/follow",
            post(handlers::follow_handler).delete(handlers::unfollow_handler),
        )
        .route("/items", get(handlers::list_items_handler).post(handlers::create_item_handler))
        .route("/items/feed", get(handlers::feed_handler))
        .route(
            "/items/{slug}",
            get(handlers::get_item_handler)
                .put(handlers::update_item_handler)
                .delete(handlers::delete_item_handler),
        )
        .route(
            "/items/{slug}/favorite",
            post(handlers::favorite_item_handler).delete(handlers::unfavorite_item_handler),
        )
        .route(
            "/items/{slug}/comments",
            get(handlers::list_comments_handler).post(handlers::create_comment_handler),
        )
        .route("/items/{slug}/comments/{id}", delete(handlers::delete_comment_handler))
        .route("/tags", get(handlers::list_tags_handler));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Migrations compiled into the binary
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs database migrations
///
/// This function applies all pending migrations to the database.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Applied {} migrations", applied.len());
    Ok(())
}
