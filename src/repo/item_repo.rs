use crate::db::DbPool;
use crate::models::{Item, NewItem, Slug, User};
use crate::schema::{comments, favorites, item_tags, item_users, items, users};
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

use super::Page;
use super::favorite_repo::{favorite_counts, favorited_among};
use super::follow_repo::{followed_among, followee_ids};
use super::item_user_repo::{ensure_item_user, find_item_user};
use super::tag_repo::{find_tag_by_name, set_item_tags, tags_for_items};
use super::user_repo::find_user_by_username;

/// An item together with everything needed to render it for one viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub item: Item,
    /// The user behind the item's `ItemUser`
    pub seller: User,
    /// Tag names, sorted
    pub tags: Vec<String>,
    pub favorites_count: i64,
    /// Whether the viewer favorited the item; always false for anonymous viewers
    pub favorited: bool,
    /// Whether the viewer follows the seller; always false for anonymous viewers
    pub seller_followed: bool,
}

/// Query-string filters of the item listing
///
/// Only the first non-empty filter applies, in the order tag, seller,
/// favorited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub tag: Option<String>,
    pub seller: Option<String>,
    pub favorited: Option<String>,
}

/// New content for an existing item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    pub title: String,
    pub description: String,
    pub body: String,
    /// `None` leaves the tag set untouched
    pub tags: Option<Vec<String>>,
}

/// Which live items a listing covers
enum ItemScope {
    All,
    Tag(i32),
    Seller(i32),
    FavoritedBy(i32),
    Sellers(Vec<i32>),
    Nothing,
}

impl ItemScope {
    fn query(&self) -> items::BoxedQuery<'static, Sqlite> {
        let query = items::table.filter(items::deleted_at.is_null()).into_boxed();
        match self {
            ItemScope::All => query,
            ItemScope::Tag(tag_id) => query.filter(
                items::id.eq_any(
                    item_tags::table
                        .filter(item_tags::tag_id.eq(*tag_id))
                        .select(item_tags::item_id),
                ),
            ),
            ItemScope::Seller(seller_id) => query.filter(items::seller_id.eq(*seller_id)),
            ItemScope::FavoritedBy(favorite_by_id) => query.filter(
                items::id.eq_any(
                    favorites::table
                        .filter(favorites::favorite_by_id.eq(*favorite_by_id))
                        .filter(favorites::deleted_at.is_null())
                        .select(favorites::item_id),
                ),
            ),
            ItemScope::Sellers(seller_ids) => query.filter(items::seller_id.eq_any(seller_ids.clone())),
            ItemScope::Nothing => query.filter(items::id.eq(-1)),
        }
    }
}

/// Creates a new item for the given seller
///
/// The slug is derived from the title and made unique among live items by
/// appending `-2`, `-3`, ... when needed. Tag names are resolved
/// find-or-create; duplicates collapse into one tag.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `seller_user_id` - The user publishing the item
/// * `title` - The title of the item
/// * `description` - Short summary
/// * `body` - Full text
/// * `tag_names` - Names of the tags to attach
///
/// ### Errors
///
/// Returns an error if the seller does not exist or any insert fails.
#[instrument(skip(pool, description, body, tag_names), fields(title = %title))]
pub fn create_item(
    pool: &DbPool,
    seller_user_id: i32,
    title: String,
    description: String,
    body: String,
    tag_names: &[String],
) -> Result<Item> {
    let conn = &mut pool.get()?;

    let item = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let seller = ensure_item_user(conn, seller_user_id)?;
        let slug = unique_slug(conn, &title, None)?;
        debug!("Inserting item with slug: {}", slug);

        let item = diesel::insert_into(items::table)
            .values(&NewItem::new(slug, title, description, body, seller.get_id()))
            .returning(Item::as_returning())
            .get_result(conn)?;

        set_item_tags(conn, item.get_id(), tag_names)?;
        Ok(item)
    })?;

    info!("Successfully created item with id: {}", item.get_id());
    Ok(item)
}

/// Retrieves a live item by its slug
#[instrument(skip(pool))]
pub fn get_item_by_slug(pool: &DbPool, slug: &str) -> Result<Option<Item>> {
    let conn = &mut pool.get()?;
    Ok(find_item_by_slug(conn, slug)?)
}

fn find_item_by_slug(conn: &mut SqliteConnection, slug: &str) -> QueryResult<Option<Item>> {
    items::table
        .filter(items::slug.eq(Slug::from(slug)))
        .filter(items::deleted_at.is_null())
        .select(Item::as_select())
        .first(conn)
        .optional()
}

/// Retrieves a live item by slug, rendered for `viewer_id`
#[instrument(skip(pool))]
pub fn get_item_view(pool: &DbPool, slug: &str, viewer_id: Option<i32>) -> Result<Option<ItemView>> {
    let conn = &mut pool.get()?;

    let view = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        match find_item_by_slug(conn, slug)? {
            Some(item) => Ok(build_item_views(conn, vec![item], viewer_id)?.pop()),
            None => Ok(None),
        }
    })?;

    Ok(view)
}

/// Updates an item's content and returns the stored result
///
/// A changed title re-derives the slug (unique among the other live items).
/// `update.tags`, when present, replaces the whole tag set.
#[instrument(skip(pool, update), fields(item_id = %item_id))]
pub fn update_item(pool: &DbPool, item_id: i32, update: ItemUpdate) -> Result<Item> {
    let conn = &mut pool.get()?;

    let item = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let current = items::table
            .filter(items::id.eq(item_id))
            .filter(items::deleted_at.is_null())
            .select(Item::as_select())
            .first(conn)?;

        let slug = if current.get_title() == update.title {
            current.get_slug().clone()
        } else {
            unique_slug(conn, &update.title, Some(item_id))?
        };

        let item = diesel::update(items::table.find(item_id))
            .set((
                items::slug.eq(slug),
                items::title.eq(&update.title),
                items::description.eq(&update.description),
                items::body.eq(&update.body),
                items::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(Item::as_returning())
            .get_result(conn)?;

        if let Some(tags) = &update.tags {
            set_item_tags(conn, item_id, tags)?;
        }
        Ok(item)
    })?;

    info!("Updated item, slug is now: {}", item.get_slug());
    Ok(item)
}

/// Soft-deletes an item together with its comments and favorites
#[instrument(skip(pool))]
pub fn delete_item(pool: &DbPool, item_id: i32) -> Result<()> {
    let conn = &mut pool.get()?;
    let now = Some(Utc::now().naive_utc());

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::update(items::table.filter(items::id.eq(item_id)).filter(items::deleted_at.is_null()))
            .set(items::deleted_at.eq(now))
            .execute(conn)?;

        let comments_removed = diesel::update(
            comments::table
                .filter(comments::item_id.eq(item_id))
                .filter(comments::deleted_at.is_null()),
        )
        .set(comments::deleted_at.eq(now))
        .execute(conn)?;

        diesel::update(
            favorites::table
                .filter(favorites::item_id.eq(item_id))
                .filter(favorites::deleted_at.is_null()),
        )
        .set(favorites::deleted_at.eq(now))
        .execute(conn)?;

        debug!("Removed {} comments with the item", comments_removed);
        Ok(())
    })?;

    info!("Deleted item with id: {}", item_id);
    Ok(())
}

/// Lists live items matching `filter`, newest first
///
/// ### Returns
///
/// The requested page of items rendered for `viewer_id`, and the total number
/// of items matching the filter. An unknown tag or username matches nothing.
#[instrument(skip(pool))]
pub fn list_items(
    pool: &DbPool,
    filter: &ItemFilter,
    page: Page,
    viewer_id: Option<i32>,
) -> Result<(Vec<ItemView>, i64)> {
    let conn = &mut pool.get()?;

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let scope = resolve_scope(conn, filter)?;

        let count: i64 = scope.query().count().get_result(conn)?;
        let found = scope
            .query()
            .order((items::created_at.desc(), items::id.desc()))
            .limit(page.limit)
            .offset(page.offset)
            .select(Item::as_select())
            .load(conn)?;

        Ok((build_item_views(conn, found, viewer_id)?, count))
    })?;

    info!("Retrieved {} of {} items", result.0.len(), result.1);
    Ok(result)
}

/// Lists live items sold by the users `user_id` follows, most recently updated first
#[instrument(skip(pool))]
pub fn item_feed(pool: &DbPool, user_id: i32, page: Page) -> Result<(Vec<ItemView>, i64)> {
    let conn = &mut pool.get()?;

    let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let followees = followee_ids(conn, user_id)?;
        let seller_ids: Vec<i32> = item_users::table
            .filter(item_users::user_id.eq_any(&followees))
            .filter(item_users::deleted_at.is_null())
            .select(item_users::id)
            .load(conn)?;
        debug!("Feed covers {} followees, {} of them sellers", followees.len(), seller_ids.len());

        let scope = ItemScope::Sellers(seller_ids);
        let count: i64 = scope.query().count().get_result(conn)?;
        let found = scope
            .query()
            .order((items::updated_at.desc(), items::id.desc()))
            .limit(page.limit)
            .offset(page.offset)
            .select(Item::as_select())
            .load(conn)?;

        Ok((build_item_views(conn, found, Some(user_id))?, count))
    })?;

    info!("Feed returned {} of {} items", result.0.len(), result.1);
    Ok(result)
}

fn resolve_scope(conn: &mut SqliteConnection, filter: &ItemFilter) -> QueryResult<ItemScope> {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

    if let Some(tag) = non_empty(&filter.tag) {
        return Ok(match find_tag_by_name(conn, &tag)? {
            Some(tag) => ItemScope::Tag(tag.get_id()),
            None => ItemScope::Nothing,
        });
    }

    if let Some(username) = non_empty(&filter.seller) {
        return Ok(match item_user_for_username(conn, &username)? {
            Some(seller_id) => ItemScope::Seller(seller_id),
            None => ItemScope::Nothing,
        });
    }

    if let Some(username) = non_empty(&filter.favorited) {
        return Ok(match item_user_for_username(conn, &username)? {
            Some(favorite_by_id) => ItemScope::FavoritedBy(favorite_by_id),
            None => ItemScope::Nothing,
        });
    }

    Ok(ItemScope::All)
}

fn item_user_for_username(conn: &mut SqliteConnection, username: &str) -> QueryResult<Option<i32>> {
    let Some(user) = find_user_by_username(conn, username)? else {
        return Ok(None);
    };
    Ok(find_item_user(conn, user.get_id())?.map(|item_user| item_user.get_id()))
}

/// Picks a slug for `title` that no other live item uses
fn unique_slug(conn: &mut SqliteConnection, title: &str, exclude_item_id: Option<i32>) -> QueryResult<Slug> {
    let base = Slug::from_title(title);
    let mut candidate = base.clone();
    let mut suffix = 1;

    loop {
        let mut query = items::table
            .filter(items::slug.eq(candidate.clone()))
            .filter(items::deleted_at.is_null())
            .into_boxed();
        if let Some(id) = exclude_item_id {
            query = query.filter(items::id.ne(id));
        }

        let taken: i64 = query.count().get_result(conn)?;
        if taken == 0 {
            return Ok(candidate);
        }

        suffix += 1;
        candidate = base.with_suffix(suffix);
    }
}

fn build_item_views(
    conn: &mut SqliteConnection,
    found: Vec<Item>,
    viewer_id: Option<i32>,
) -> QueryResult<Vec<ItemView>> {
    if found.is_empty() {
        return Ok(Vec::new());
    }

    let item_ids: Vec<i32> = found.iter().map(Item::get_id).collect();
    let seller_ids: Vec<i32> = found.iter().map(Item::get_seller_id).collect();

    let sellers: HashMap<i32, User> = item_users::table
        .inner_join(users::table)
        .filter(item_users::id.eq_any(&seller_ids))
        .select((item_users::id, User::as_select()))
        .load::<(i32, User)>(conn)?
        .into_iter()
        .collect();

    let mut tags: HashMap<i32, Vec<String>> = HashMap::new();
    for (item_id, tag) in tags_for_items(conn, &item_ids)? {
        tags.entry(item_id).or_default().push(tag.get_name().to_string());
    }

    let counts = favorite_counts(conn, &item_ids)?;

    let (favorited, followed): (HashSet<i32>, HashSet<i32>) = match viewer_id {
        Some(viewer_id) => {
            let favorited = match find_item_user(conn, viewer_id)? {
                Some(viewer) => favorited_among(conn, viewer.get_id(), &item_ids)?.into_iter().collect(),
                None => HashSet::new(),
            };
            let seller_user_ids: Vec<i32> = sellers.values().map(User::get_id).collect();
            let followed = followed_among(conn, viewer_id, &seller_user_ids)?.into_iter().collect();
            (favorited, followed)
        }
        None => (HashSet::new(), HashSet::new()),
    };

    found
        .into_iter()
        .map(|item| {
            let seller = sellers
                .get(&item.get_seller_id())
                .cloned()
                .ok_or(diesel::result::Error::NotFound)?;
            let item_id = item.get_id();
            Ok(ItemView {
                tags: tags.remove(&item_id).unwrap_or_default(),
                favorites_count: counts.get(&item_id).copied().unwrap_or(0),
                favorited: favorited.contains(&item_id),
                seller_followed: followed.contains(&seller.get_id()),
                seller,
                item,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
