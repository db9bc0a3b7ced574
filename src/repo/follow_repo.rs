use crate::db::DbPool;
use crate::models::{Follow, NewFollow};
use crate::schema::follows;
use anyhow::{Result, bail};
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Makes `follower_id` follow `followee_id`
///
/// Following someone twice leaves a single live edge.
///
/// ### Errors
///
/// Returns an error if a user tries to follow themselves or the insert fails.
#[instrument(skip(pool))]
pub fn follow_user(pool: &DbPool, follower_id: i32, followee_id: i32) -> Result<Follow> {
    if follower_id == followee_id {
        bail!("A user cannot follow themselves");
    }

    let conn = &mut pool.get()?;

    let follow = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let existing = follows::table
            .filter(follows::follower_id.eq(follower_id))
            .filter(follows::followee_id.eq(followee_id))
            .filter(follows::deleted_at.is_null())
            .select(Follow::as_select())
            .first(conn)
            .optional()?;

        if let Some(follow) = existing {
            debug!("Follow edge already present");
            return Ok(follow);
        }

        diesel::insert_into(follows::table)
            .values(&NewFollow::new(follower_id, followee_id))
            .returning(Follow::as_returning())
            .get_result(conn)
    })?;

    info!("User {} follows user {}", follower_id, followee_id);
    Ok(follow)
}

/// Removes the live follow edge between two users, if any
#[instrument(skip(pool))]
pub fn unfollow_user(pool: &DbPool, follower_id: i32, followee_id: i32) -> Result<()> {
    let conn = &mut pool.get()?;

    let removed = diesel::update(
        follows::table
            .filter(follows::follower_id.eq(follower_id))
            .filter(follows::followee_id.eq(followee_id))
            .filter(follows::deleted_at.is_null()),
    )
    .set(follows::deleted_at.eq(Some(Utc::now().naive_utc())))
    .execute(conn)?;

    debug!("Removed {} follow edges", removed);
    Ok(())
}

/// Whether `follower_id` currently follows `followee_id`
#[instrument(skip(pool))]
pub fn is_following(pool: &DbPool, follower_id: i32, followee_id: i32) -> Result<bool> {
    let conn = &mut pool.get()?;
    let ids = followed_among(conn, follower_id, &[followee_id])?;
    Ok(!ids.is_empty())
}

/// Returns the subset of `candidates` that `follower_id` follows
pub(crate) fn followed_among(
    conn: &mut SqliteConnection,
    follower_id: i32,
    candidates: &[i32],
) -> QueryResult<Vec<i32>> {
    follows::table
        .filter(follows::follower_id.eq(follower_id))
        .filter(follows::followee_id.eq_any(candidates))
        .filter(follows::deleted_at.is_null())
        .select(follows::followee_id)
        .load(conn)
}

/// User IDs that `follower_id` follows
pub(crate) fn followee_ids(conn: &mut SqliteConnection, follower_id: i32) -> QueryResult<Vec<i32>> {
    follows::table
        .filter(follows::follower_id.eq(follower_id))
        .filter(follows::deleted_at.is_null())
        .select(follows::followee_id)
        .load(conn)
}
