use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::{instrument, debug, info, warn};

use crate::auth::{AuthUser, MaybeUser};
use crate::errors::ApiError;
use crate::repo::{self, CommentView};
use crate::serializers::{CommentBody, CommentListBody, CommentResponse};
use crate::validators::{AppJson, CommentDto, CommentEnvelope};
use crate::AppState;

use super::item_handlers::find_item_view;

/// Handler for commenting on an item
///
/// This function handles POST requests to `/api/items/{slug}/comments`.
///
/// ### Returns
///
/// 201 with the comment and its author
#[instrument(skip(state, me, payload), fields(user_id = me.get_id()))]
pub async fn create_comment_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<CommentEnvelope<CommentDto>>,
) -> Result<(StatusCode, Json<CommentBody>), ApiError> {
    let item = find_item_view(&state, &slug, Some(me.get_id()), "comment")?.item;

    let form = payload.comment;
    form.validate()?;

    let comment = repo::create_comment(&state.pool, item.get_id(), me.get_id(), form.body)?;
    info!("Created comment {} on item {}", comment.get_id(), item.get_id());

    let view = CommentView {
        comment,
        author: me,
        author_followed: false,
    };
    Ok((
        StatusCode::CREATED,
        Json(CommentBody {
            comment: CommentResponse::from(&view),
        }),
    ))
}

/// Handler for listing the comments of an item
///
/// This function handles GET requests to `/api/items/{slug}/comments`.
#[instrument(skip(state, viewer))]
pub async fn list_comments_handler(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<CommentListBody>, ApiError> {
    let item = find_item_view(&state, &slug, viewer.id(), "comments")?.item;

    let views = repo::list_comments(&state.pool, item.get_id(), viewer.id())?;
    debug!("Found {} comments", views.len());

    Ok(Json(CommentListBody {
        comments: views.iter().map(CommentResponse::from).collect(),
    }))
}

/// Handler for deleting a comment
///
/// This function handles DELETE requests to `/api/items/{slug}/comments/{id}`.
/// A malformed id, an unknown id and a comment of another item are all
/// reported as `{"comment":"Invalid id"}`. Only the author may delete.
#[instrument(skip(state, me), fields(user_id = me.get_id()))]
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path((slug, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let invalid_id = || ApiError::not_found("comment", "Invalid id");

    let comment_id: i32 = id.parse().map_err(|_| invalid_id())?;
    let item = find_item_view(&state, &slug, Some(me.get_id()), "comment")?.item;

    let (comment, author) = repo::get_comment(&state.pool, item.get_id(), comment_id)?.ok_or_else(invalid_id)?;
    if author.get_id() != me.get_id() {
        warn!("User {} tried to delete comment {} of user {}", me.get_id(), comment.get_id(), author.get_id());
        return Err(ApiError::forbidden("comment", "Only the author can delete this comment"));
    }

    repo::delete_comment(&state.pool, comment.get_id())?;
    info!("Deleted comment {}", comment.get_id());

    Ok(Json(json!({ "comment": "Delete success" })))
}
