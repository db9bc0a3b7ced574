use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

/// Represents a tag in the system
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tag {
    /// Auto-incremented identifier
    id: i32,

    /// The name of the tag, unique across all tags
    name: String,

    /// When this tag was created
    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,

    deleted_at: Option<NaiveDateTime>,
}

impl Tag {
    /// Gets the tag's ID
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// Gets the tag's name
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Gets the tag's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag {
    name: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewTag {
    /// Creates a new tag record with the given name
    pub fn new(name: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            name,
            created_at: now,
            updated_at: now,
        }
    }
}
