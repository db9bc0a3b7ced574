use crate::db::DbPool;
use crate::models::{ItemTag, NewTag, Tag};
use crate::schema::{item_tags, tags};
use anyhow::Result;
use diesel::prelude::*;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Lists all live tags ordered by name
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_tags(pool: &DbPool) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;

    let result = tags::table
        .filter(tags::deleted_at.is_null())
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load(conn)?;

    debug!("Retrieved {} tags", result.len());
    Ok(result)
}

pub(crate) fn find_tag_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Tag>> {
    tags::table
        .filter(tags::name.eq(name))
        .filter(tags::deleted_at.is_null())
        .select(Tag::as_select())
        .first(conn)
        .optional()
}

/// Resolves tag names to tags, creating the missing ones
///
/// Repeated and empty names are dropped, so each distinct name maps to exactly
/// one tag. The order of first appearance is kept.
pub(crate) fn get_or_create_tags(conn: &mut SqliteConnection, names: &[String]) -> QueryResult<Vec<Tag>> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !seen.insert(name.to_string()) {
            continue;
        }

        let tag = match find_tag_by_name(conn, name)? {
            Some(tag) => tag,
            None => diesel::insert_into(tags::table)
                .values(&NewTag::new(name.to_string()))
                .returning(Tag::as_returning())
                .get_result(conn)?,
        };
        resolved.push(tag);
    }

    Ok(resolved)
}

/// Replaces the tag set of an item with the given names
pub(crate) fn set_item_tags(conn: &mut SqliteConnection, item_id: i32, names: &[String]) -> QueryResult<Vec<Tag>> {
    let resolved = get_or_create_tags(conn, names)?;

    diesel::delete(item_tags::table.filter(item_tags::item_id.eq(item_id))).execute(conn)?;

    let links: Vec<ItemTag> = resolved
        .iter()
        .map(|tag| ItemTag::new(item_id, tag.get_id()))
        .collect();
    if !links.is_empty() {
        diesel::insert_into(item_tags::table)
            .values(&links)
            .execute(conn)?;
    }

    Ok(resolved)
}

/// Loads `(item_id, tag)` pairs for the given items, tags sorted by name
pub(crate) fn tags_for_items(conn: &mut SqliteConnection, item_ids: &[i32]) -> QueryResult<Vec<(i32, Tag)>> {
    item_tags::table
        .inner_join(tags::table)
        .filter(item_tags::item_id.eq_any(item_ids))
        .filter(tags::deleted_at.is_null())
        .order(tags::name.asc())
        .select((item_tags::item_id, Tag::as_select()))
        .load(conn)
}
