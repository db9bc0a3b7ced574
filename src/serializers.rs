use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::User;
use crate::repo::{CommentView, ItemView};

/// Renders timestamps as `2006-01-02T15:04:05.000Z`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// The authenticated user, including a freshly issued token
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub bio: String,
    pub image: Option<String>,
    pub token: String,
}

impl UserResponse {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            username: user.get_username().to_string(),
            email: user.get_email().to_string(),
            bio: user.get_bio().to_string(),
            image: user.get_image().map(str::to_string),
            token,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct UserBody {
    pub user: UserResponse,
}

/// Public view of a user; also used for item sellers and comment authors
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub username: String,
    pub bio: String,
    pub image: Option<String>,
    pub following: bool,
}

impl ProfileResponse {
    pub fn new(user: &User, following: bool) -> Self {
        Self {
            username: user.get_username().to_string(),
            bio: user.get_bio().to_string(),
            image: user.get_image().map(str::to_string),
            following,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ProfileBody {
    pub profile: ProfileResponse,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub seller: ProfileResponse,
    pub tag_list: Vec<String>,
    pub favorited: bool,
    pub favorites_count: i64,
}

impl From<&ItemView> for ItemResponse {
    fn from(view: &ItemView) -> Self {
        let mut tag_list = view.tags.clone();
        tag_list.sort();
        Self {
            slug: view.item.get_slug().to_string(),
            title: view.item.get_title().to_string(),
            description: view.item.get_description().to_string(),
            body: view.item.get_body().to_string(),
            created_at: format_timestamp(view.item.get_created_at()),
            updated_at: format_timestamp(view.item.get_updated_at()),
            seller: ProfileResponse::new(&view.seller, view.seller_followed),
            tag_list,
            favorited: view.favorited,
            favorites_count: view.favorites_count,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ItemBody {
    pub item: ItemResponse,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ItemListBody {
    pub items: Vec<ItemResponse>,
    pub items_count: i64,
}

impl ItemListBody {
    pub fn new(views: &[ItemView], items_count: i64) -> Self {
        Self {
            items: views.iter().map(ItemResponse::from).collect(),
            items_count,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i32,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub seller: ProfileResponse,
}

impl From<&CommentView> for CommentResponse {
    fn from(view: &CommentView) -> Self {
        Self {
            id: view.comment.get_id(),
            body: view.comment.get_body().to_string(),
            created_at: format_timestamp(view.comment.get_created_at()),
            updated_at: format_timestamp(view.comment.get_updated_at()),
            seller: ProfileResponse::new(&view.author, view.author_followed),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CommentBody {
    pub comment: CommentResponse,
}

#[derive(Serialize, Debug)]
pub struct CommentListBody {
    pub comments: Vec<CommentResponse>,
}

#[derive(Serialize, Debug)]
pub struct TagListBody {
    pub tags: Vec<String>,
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::test_utils::arb_datetime_utc;
    use proptest::prelude::*;

    proptest! {
        /// Formatted timestamps are fixed-width and parse back to the same instant
        #[test]
        fn prop_timestamp_format_roundtrip(ts in arb_datetime_utc()) {
            let formatted = format_timestamp(ts);
            prop_assert_eq!(formatted.len(), 24);
            prop_assert!(formatted.ends_with('Z'));

            let parsed = DateTime::parse_from_rfc3339(&formatted).unwrap().with_timezone(&Utc);
            prop_assert_eq!(parsed, ts);
        }
    }
}
