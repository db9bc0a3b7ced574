use crate::db::DbPool;
use crate::models::{Comment, NewComment, User};
use crate::schema::{comments, item_users, users};
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use super::follow_repo::followed_among;
use super::item_user_repo::ensure_item_user;

/// A comment together with its author, as seen by a particular viewer
#[derive(Debug, Clone, PartialEq)]
pub struct CommentView {
    pub comment: Comment,
    pub author: User,
    /// Whether the viewer follows the author; false for anonymous viewers
    pub author_followed: bool,
}

/// Adds a comment to an item on behalf of `user_id`
#[instrument(skip(pool, body))]
pub fn create_comment(pool: &DbPool, item_id: i32, user_id: i32, body: String) -> Result<Comment> {
    let conn = &mut pool.get()?;

    let comment = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let author = ensure_item_user(conn, user_id)?;
        diesel::insert_into(comments::table)
            .values(&NewComment::new(body, item_id, author.get_id()))
            .returning(Comment::as_returning())
            .get_result(conn)
    })?;

    info!("Created comment {} on item {}", comment.get_id(), item_id);
    Ok(comment)
}

/// Lists the live comments of an item, oldest first
#[instrument(skip(pool))]
pub fn list_comments(pool: &DbPool, item_id: i32, viewer_id: Option<i32>) -> Result<Vec<CommentView>> {
    let conn = &mut pool.get()?;

    let views: Vec<CommentView> = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let rows: Vec<(Comment, User)> = comments::table
            .inner_join(item_users::table.inner_join(users::table))
            .filter(comments::item_id.eq(item_id))
            .filter(comments::deleted_at.is_null())
            .order((comments::created_at.asc(), comments::id.asc()))
            .select((Comment::as_select(), User::as_select()))
            .load(conn)?;

        let followed: HashSet<i32> = match viewer_id {
            Some(viewer) => {
                let author_ids: Vec<i32> = rows.iter().map(|(_, author)| author.get_id()).collect();
                followed_among(conn, viewer, &author_ids)?.into_iter().collect()
            }
            None => HashSet::new(),
        };

        Ok(rows
            .into_iter()
            .map(|(comment, author)| {
                let author_followed = followed.contains(&author.get_id());
                CommentView {
                    comment,
                    author,
                    author_followed,
                }
            })
            .collect())
    })?;

    debug!("Retrieved {} comments", views.len());
    Ok(views)
}

/// Retrieves a live comment of the given item with its author
///
/// A comment that exists but belongs to another item is reported as absent.
#[instrument(skip(pool))]
pub fn get_comment(pool: &DbPool, item_id: i32, comment_id: i32) -> Result<Option<(Comment, User)>> {
    let conn = &mut pool.get()?;

    let found = comments::table
        .inner_join(item_users::table.inner_join(users::table))
        .filter(comments::id.eq(comment_id))
        .filter(comments::item_id.eq(item_id))
        .filter(comments::deleted_at.is_null())
        .select((Comment::as_select(), User::as_select()))
        .first(conn)
        .optional()?;

    Ok(found)
}

/// Soft-deletes a comment
#[instrument(skip(pool))]
pub fn delete_comment(pool: &DbPool, comment_id: i32) -> Result<()> {
    let conn = &mut pool.get()?;

    let removed = diesel::update(
        comments::table
            .find(comment_id)
            .filter(comments::deleted_at.is_null()),
    )
    .set(comments::deleted_at.eq(Some(Utc::now().naive_utc())))
    .execute(conn)?;

    if removed == 0 {
        return Err(anyhow::anyhow!("Comment not found"));
    }

    info!("Deleted comment {}", comment_id);
    Ok(())
}
