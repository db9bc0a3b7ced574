use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

/// Represents a registered user
///
/// This struct maps directly to the `users` table in the database. The
/// password is only ever stored as an argon2 PHC string.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Auto-incremented identifier
    id: i32,

    /// Public handle, unique among live users
    username: String,

    /// Login email, unique among live users
    email: String,

    /// Free-form biography, empty when unset
    bio: String,

    /// Optional avatar URL
    image: Option<String>,

    /// Argon2 hash of the user's password
    password_hash: String,

    /// When this user registered
    created_at: NaiveDateTime,

    /// When this user last changed their profile
    updated_at: NaiveDateTime,

    /// Set when the user has been soft-deleted
    deleted_at: Option<NaiveDateTime>,
}

impl User {
    /// Gets the user's ID
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// Gets the user's username
    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// Gets the user's email
    pub fn get_email(&self) -> &str {
        &self.email
    }

    /// Gets the user's biography
    pub fn get_bio(&self) -> &str {
        &self.bio
    }

    /// Gets the user's avatar URL, if any
    pub fn get_image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Gets the stored password hash
    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Gets the registration timestamp
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the timestamp of the last profile change
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Insertable form of a user; the ID is assigned by the database
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    username: String,
    email: String,
    bio: String,
    image: Option<String>,
    password_hash: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewUser {
    /// Creates a new user record with an empty profile
    ///
    /// ### Arguments
    ///
    /// * `username` - The public handle
    /// * `email` - The login email
    /// * `password_hash` - An already-hashed password
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            username,
            email,
            bio: String::new(),
            image: None,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
