use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

/// Represents an association between an item and a tag
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::item_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemTag {
    /// The ID of the item
    item_id: i32,

    /// The ID of the tag
    tag_id: i32,

    /// When this item tag was created
    created_at: NaiveDateTime,
}

impl ItemTag {
    /// Creates a new item tag association
    ///
    /// ### Arguments
    ///
    /// * `item_id` - The ID of the item
    /// * `tag_id` - The ID of the tag
    ///
    /// ### Returns
    ///
    /// A new `ItemTag` instance with the specified item ID and tag ID
    pub fn new(item_id: i32, tag_id: i32) -> Self {
        Self {
            item_id,
            tag_id,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Gets the item ID
    pub fn get_item_id(&self) -> i32 {
        self.item_id
    }

    /// Gets the tag ID
    pub fn get_tag_id(&self) -> i32 {
        self.tag_id
    }

    /// Gets the creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
