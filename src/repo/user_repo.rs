use crate::db::DbPool;
use crate::models::{NewUser, User};
use crate::schema::users;
use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a new user
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `username` - The public handle
/// * `email` - The login email
/// * `password_hash` - The argon2 hash of the password
///
/// ### Errors
///
/// Returns an error if the username or email is already taken by a live user,
/// or if the insert fails for any other reason.
#[instrument(skip(pool, password_hash), fields(username = %username))]
pub fn create_user(pool: &DbPool, username: String, email: String, password_hash: String) -> Result<User> {
    let conn = &mut pool.get()?;

    let new_user = NewUser::new(username, email, password_hash);
    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)?;

    info!("Created user with id: {}", user.get_id());
    Ok(user)
}

/// Retrieves a live user by ID
#[instrument(skip(pool))]
pub fn get_user(pool: &DbPool, user_id: i32) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    Ok(find_user_by_id(conn, user_id)?)
}

pub(crate) fn find_user_by_id(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Option<User>> {
    users::table
        .filter(users::id.eq(user_id))
        .filter(users::deleted_at.is_null())
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// Retrieves a live user by username
#[instrument(skip(pool))]
pub fn get_user_by_username(pool: &DbPool, username: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    Ok(find_user_by_username(conn, username)?)
}

pub(crate) fn find_user_by_username(conn: &mut SqliteConnection, username: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::username.eq(username))
        .filter(users::deleted_at.is_null())
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// Retrieves a live user by email, used for login
#[instrument(skip(pool))]
pub fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::email.eq(email))
        .filter(users::deleted_at.is_null())
        .select(User::as_select())
        .first(conn)
        .optional()?;

    if result.is_none() {
        debug!("No user registered with this email");
    }
    Ok(result)
}

/// Profile fields to change; `None` keeps the stored value
#[derive(AsChangeset, Debug, Default, Clone)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    /// `Some(None)` clears the image
    pub image: Option<Option<String>>,
    pub password_hash: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Updates a user's profile and returns the stored result
///
/// ### Errors
///
/// Returns an error if the user does not exist, or if the new username or
/// email collides with another live user.
#[instrument(skip(pool, changes))]
pub fn update_user(pool: &DbPool, user_id: i32, changes: UserChangeset) -> Result<User> {
    let conn = &mut pool.get()?;

    let changes = UserChangeset {
        updated_at: Some(Utc::now().naive_utc()),
        ..changes
    };

    let user = diesel::update(
        users::table
            .filter(users::id.eq(user_id))
            .filter(users::deleted_at.is_null()),
    )
    .set(&changes)
    .returning(User::as_returning())
    .get_result(conn)
    .optional()?
    .ok_or_else(|| anyhow::anyhow!("User with id {} not found", user_id))?;

    debug!("Updated user with id: {}", user.get_id());
    Ok(user)
}
