/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database: users and the
/// follow graph, items with their tags, favorites and comments.
///
/// Public functions take the pool and check out a connection themselves.
/// Reads that span several queries run inside a single transaction so the
/// caller sees one consistent snapshot.

mod user_repo;
mod follow_repo;
mod item_user_repo;
mod item_repo;
mod tag_repo;
mod favorite_repo;
mod comment_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use follow_repo::*;
pub use item_repo::*;
pub use tag_repo::*;
pub use favorite_repo::*;
pub use comment_repo::*;

/// Default page size for item listings
pub const DEFAULT_LIMIT: i64 = 20;

/// Offset/limit pair applied to item listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Builds a page from raw query-string values
    ///
    /// Missing, non-numeric or negative values fall back to the defaults
    /// (limit 20, offset 0).
    pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v >= 0)
        };
        Self {
            limit: parse(limit).unwrap_or(DEFAULT_LIMIT),
            offset: parse(offset).unwrap_or(0),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use crate::db::{self, DbPool};
    use crate::models::User;

    /// Sets up a test database with migrations applied
    ///
    /// This function:
    /// 1. Creates an in-memory SQLite database
    /// 2. Runs all migrations to set up the schema
    ///
    /// Foreign keys are enabled by the pool's connection customizer.
    ///
    /// ### Returns
    ///
    /// A database connection pool connected to the in-memory database
    pub fn setup_test_db() -> Arc<DbPool> {
        // Use a unique shared in-memory database for each test.
        // Plain ":memory:" gives each connection its own separate database,
        // so migrations run on one connection wouldn't be visible on others.
        let unique_id = uuid::Uuid::new_v4();
        let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
        let pool = db::init_pool(&database_url).expect("Failed to create pool");

        let mut conn = pool.get().expect("Failed to get connection");
        crate::run_migrations(&mut conn).expect("Failed to run migrations");

        Arc::new(pool)
    }

    /// Registers a user with a placeholder password hash
    pub fn create_test_user(pool: &DbPool, username: &str) -> User {
        super::create_user(
            pool,
            username.to_string(),
            format!("{}@example.com", username),
            "not-a-real-hash".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(super::Page::from_params(None, None), super::Page { limit: 20, offset: 0 });
    }

    #[test]
    fn test_page_parses_numbers() {
        assert_eq!(
            super::Page::from_params(Some("5"), Some("10")),
            super::Page { limit: 5, offset: 10 }
        );
    }

    #[test]
    fn test_page_non_numeric_falls_back() {
        assert_eq!(
            super::Page::from_params(Some("lots"), Some("-3")),
            super::Page { limit: 20, offset: 0 }
        );
    }
}
