use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{instrument, info};

use crate::auth::{AuthUser, MaybeUser};
use crate::errors::ApiError;
use crate::models::User;
use crate::repo;
use crate::serializers::{ProfileBody, ProfileResponse};
use crate::validators::FieldErrors;
use crate::AppState;

fn find_profile_user(state: &AppState, username: &str) -> Result<User, ApiError> {
    repo::get_user_by_username(&state.pool, username)?
        .ok_or(ApiError::not_found("profile", "Invalid username"))
}

fn profile_body(user: &User, following: bool) -> Json<ProfileBody> {
    Json(ProfileBody {
        profile: ProfileResponse::new(user, following),
    })
}

/// Handler for retrieving a profile
///
/// This function handles GET requests to `/api/profiles/{username}`.
/// `following` is only ever true for a logged-in caller.
#[instrument(skip(state, viewer))]
pub async fn get_profile_handler(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, ApiError> {
    let user = find_profile_user(&state, &username)?;

    let following = match viewer.id() {
        Some(viewer_id) => repo::is_following(&state.pool, viewer_id, user.get_id())?,
        None => false,
    };

    Ok(profile_body(&user, following))
}

/// Handler for following a user
///
/// This function handles POST requests to `/api/profiles/{username}/follow`.
#[instrument(skip(state, me), fields(follower_id = me.get_id()))]
pub async fn follow_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, ApiError> {
    let user = find_profile_user(&state, &username)?;

    if user.get_id() == me.get_id() {
        return Err(FieldErrors::single("profile", "You cannot follow yourself").into());
    }

    repo::follow_user(&state.pool, me.get_id(), user.get_id())?;
    info!("User {} now follows {}", me.get_id(), user.get_id());

    Ok(profile_body(&user, true))
}

/// Handler for unfollowing a user
///
/// This function handles DELETE requests to `/api/profiles/{username}/follow`.
#[instrument(skip(state, me), fields(follower_id = me.get_id()))]
pub async fn unfollow_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, ApiError> {
    let user = find_profile_user(&state, &username)?;

    repo::unfollow_user(&state.pool, me.get_id(), user.get_id())?;

    Ok(profile_body(&user, false))
}
