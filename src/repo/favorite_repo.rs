use crate::db::DbPool;
use crate::models::{Favorite, NewFavorite};
use crate::schema::favorites;
use anyhow::Result;
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::item_user_repo::{ensure_item_user, find_item_user};

/// Marks an item as favorited by a user
///
/// Find-or-create on the live (item, user) pair: favoriting the same item
/// twice returns the existing row and never double-counts.
#[instrument(skip(pool))]
pub fn favorite_item(pool: &DbPool, item_id: i32, user_id: i32) -> Result<Favorite> {
    let conn = &mut pool.get()?;

    let favorite = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let favoriter = ensure_item_user(conn, user_id)?;

        let existing = favorites::table
            .filter(favorites::item_id.eq(item_id))
            .filter(favorites::favorite_by_id.eq(favoriter.get_id()))
            .filter(favorites::deleted_at.is_null())
            .select(Favorite::as_select())
            .first(conn)
            .optional()?;

        match existing {
            Some(favorite) => Ok(favorite),
            None => diesel::insert_into(favorites::table)
                .values(&NewFavorite::new(item_id, favoriter.get_id()))
                .returning(Favorite::as_returning())
                .get_result(conn),
        }
    })?;

    info!("Item {} favorited by user {}", item_id, user_id);
    Ok(favorite)
}

/// Removes a user's favorite from an item; a no-op when there is none
#[instrument(skip(pool))]
pub fn unfavorite_item(pool: &DbPool, item_id: i32, user_id: i32) -> Result<()> {
    let conn = &mut pool.get()?;

    let Some(favoriter) = find_item_user(conn, user_id)? else {
        debug!("User has never favorited anything");
        return Ok(());
    };

    let removed = diesel::update(
        favorites::table
            .filter(favorites::item_id.eq(item_id))
            .filter(favorites::favorite_by_id.eq(favoriter.get_id()))
            .filter(favorites::deleted_at.is_null()),
    )
    .set(favorites::deleted_at.eq(Some(Utc::now().naive_utc())))
    .execute(conn)?;

    debug!("Removed {} favorites", removed);
    Ok(())
}

/// Live favorite counts per item; items without favorites are absent
pub(crate) fn favorite_counts(conn: &mut SqliteConnection, item_ids: &[i32]) -> QueryResult<HashMap<i32, i64>> {
    let rows: Vec<(i32, i64)> = favorites::table
        .filter(favorites::item_id.eq_any(item_ids))
        .filter(favorites::deleted_at.is_null())
        .group_by(favorites::item_id)
        .select((favorites::item_id, count_star()))
        .load(conn)?;
    Ok(rows.into_iter().collect())
}

/// The subset of `item_ids` favorited by the given `ItemUser`
pub(crate) fn favorited_among(
    conn: &mut SqliteConnection,
    favorite_by_id: i32,
    item_ids: &[i32],
) -> QueryResult<Vec<i32>> {
    favorites::table
        .filter(favorites::favorite_by_id.eq(favorite_by_id))
        .filter(favorites::item_id.eq_any(item_ids))
        .filter(favorites::deleted_at.is_null())
        .select(favorites::item_id)
        .load(conn)
}
