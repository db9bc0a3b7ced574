use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

/// A directed "follower follows followee" edge between two users
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::follows)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Follow {
    id: i32,
    follower_id: i32,
    followee_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    deleted_at: Option<NaiveDateTime>,
}

impl Follow {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    /// The user doing the following
    pub fn get_follower_id(&self) -> i32 {
        self.follower_id
    }

    /// The user being followed
    pub fn get_followee_id(&self) -> i32 {
        self.followee_id
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::follows)]
pub struct NewFollow {
    follower_id: i32,
    followee_id: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewFollow {
    pub fn new(follower_id: i32, followee_id: i32) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            follower_id,
            followee_id,
            created_at: now,
            updated_at: now,
        }
    }
}
