use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

/// Item-side handle of a user
///
/// Items, comments and favorites point at an `ItemUser` rather than at the
/// `users` table directly, so the item side of the schema never depends on the
/// shape of the user record. There is at most one `ItemUser` per user.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::item_users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemUser {
    id: i32,
    user_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    deleted_at: Option<NaiveDateTime>,
}

impl ItemUser {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_user_id(&self) -> i32 {
        self.user_id
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::item_users)]
pub struct NewItemUser {
    user_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewItemUser {
    pub fn new(user_id: i32) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}
