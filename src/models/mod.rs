/// Data models module
///
/// This module defines the diesel entities backing the marketplace: users and
/// their follow graph, the item-side user indirection, items with their tags,
/// favorites and comments. Every table carries `created_at`/`updated_at`
/// timestamps and a nullable `deleted_at` used for soft deletion.

// Re-export all model types
mod slug;
pub use slug::Slug;

mod user;
pub use user::{NewUser, User};

mod follow;
pub use follow::{Follow, NewFollow};

mod item_user;
pub use item_user::{ItemUser, NewItemUser};

mod item;
pub use item::{Item, NewItem};

mod tag;
pub use tag::{NewTag, Tag};

mod item_tag;
pub use item_tag::ItemTag;

mod favorite;
pub use favorite::{Favorite, NewFavorite};

mod comment;
pub use comment::{Comment, NewComment};
