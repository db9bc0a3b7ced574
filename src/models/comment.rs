use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

/// A comment left on an item
///
/// The author is referenced through its `ItemUser` (`seller_id`), the same
/// indirection items use for their seller.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Comment {
    id: i32,
    body: String,
    item_id: i32,
    seller_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    deleted_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_body(&self) -> &str {
        &self.body
    }

    pub fn get_item_id(&self) -> i32 {
        self.item_id
    }

    /// The `ItemUser` who wrote the comment
    pub fn get_seller_id(&self) -> i32 {
        self.seller_id
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    body: String,
    item_id: i32,
    seller_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewComment {
    pub fn new(body: String, item_id: i32, seller_id: i32) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            body,
            item_id,
            seller_id,
            created_at: now,
            updated_at: now,
        }
    }
}
