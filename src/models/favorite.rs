use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

/// Records that an `ItemUser` favorited an item
///
/// At most one live row exists per (item, favoriter) pair; unfavoriting
/// soft-deletes it.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::favorites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Favorite {
    id: i32,
    item_id: i32,
    favorite_by_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    deleted_at: Option<NaiveDateTime>,
}

impl Favorite {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_item_id(&self) -> i32 {
        self.item_id
    }

    /// The `ItemUser` who favorited the item
    pub fn get_favorite_by_id(&self) -> i32 {
        self.favorite_by_id
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::favorites)]
pub struct NewFavorite {
    item_id: i32,
    favorite_by_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewFavorite {
    pub fn new(item_id: i32, favorite_by_id: i32) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            item_id,
            favorite_by_id,
            created_at: now,
            updated_at: now,
        }
    }
}
