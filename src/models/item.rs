use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

use super::Slug;

/// Represents an item (article) offered by a seller
///
/// This struct maps directly to the `items` table in the database. The
/// seller is referenced through its `ItemUser`, not the user row itself.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Item {
    /// Auto-incremented identifier
    id: i32,

    /// URL identifier, unique among live items
    slug: Slug,

    /// The title of the item
    title: String,

    /// Short summary, at most 2048 characters
    description: String,

    /// Full text, at most 2048 characters
    body: String,

    /// The `ItemUser` that published this item
    seller_id: i32,

    /// When this item was created
    created_at: NaiveDateTime,

    /// When this item was last updated
    updated_at: NaiveDateTime,

    /// Set when the item has been soft-deleted
    deleted_at: Option<NaiveDateTime>,
}

impl Item {
    /// Gets the item's ID
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// Gets the item's slug
    pub fn get_slug(&self) -> &Slug {
        &self.slug
    }

    /// Gets the item's title
    pub fn get_title(&self) -> &str {
        &self.title
    }

    /// Gets the item's description
    pub fn get_description(&self) -> &str {
        &self.description
    }

    /// Gets the item's body
    pub fn get_body(&self) -> &str {
        &self.body
    }

    /// Gets the ID of the `ItemUser` selling this item
    pub fn get_seller_id(&self) -> i32 {
        self.seller_id
    }

    /// Gets the item's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the item's updated timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Insertable form of an item
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem {
    slug: Slug,
    title: String,
    description: String,
    body: String,
    seller_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewItem {
    /// Creates a new item record
    ///
    /// ### Arguments
    ///
    /// * `slug` - A slug already checked for uniqueness
    /// * `title` - The title of the item
    /// * `description` - Short summary
    /// * `body` - Full text
    /// * `seller_id` - The `ItemUser` publishing the item
    pub fn new(slug: Slug, title: String, description: String, body: String, seller_id: i32) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            slug,
            title,
            description,
            body,
            seller_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_slug(&self) -> &Slug {
        &self.slug
    }
}
