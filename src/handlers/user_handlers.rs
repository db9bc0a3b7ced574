use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::{instrument, debug, info, warn};

use crate::auth::{self, AuthUser};
use crate::errors::ApiError;
use crate::models::User;
use crate::repo::{self, UserChangeset};
use crate::serializers::{UserBody, UserResponse};
use crate::validators::{AppJson, LoginDto, RegistrationDto, UserEnvelope, UserUpdateDto};
use crate::AppState;

/// Wraps a user and a freshly issued token in the `{"user": …}` envelope
fn user_body(state: &AppState, user: &User) -> Result<Json<UserBody>, ApiError> {
    let token = state.tokens.issue(user.get_id())?;
    Ok(Json(UserBody {
        user: UserResponse::new(user, token),
    }))
}

/// Handler for registering a new user
///
/// This function handles POST requests to `/api/users`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `payload` - `{"user":{username,email,password}}`
///
/// ### Returns
///
/// 201 with the new user and a token. A taken username or email is reported
/// as a `database` error.
#[instrument(skip(state, payload), fields(username = %payload.user.username))]
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserEnvelope<RegistrationDto>>,
) -> Result<(StatusCode, Json<UserBody>), ApiError> {
    let form = payload.user;
    form.validate()?;

    let password_hash = auth::hash_password(&form.password)?;
    let user = repo::create_user(&state.pool, form.username, form.email, password_hash)?;

    info!("Registered user {}", user.get_id());
    Ok((StatusCode::CREATED, user_body(&state, &user)?))
}

/// Handler for logging in
///
/// This function handles POST requests to `/api/users/login`.
/// An unknown email and a wrong password produce the same 403 answer.
#[instrument(skip(state, payload))]
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserEnvelope<LoginDto>>,
) -> Result<Json<UserBody>, ApiError> {
    let form = payload.user;
    form.validate()?;

    let rejected = || ApiError::forbidden("login", "Not Registered email or invalid password");

    let user = repo::get_user_by_email(&state.pool, &form.email)?.ok_or_else(rejected)?;
    if !auth::verify_password(&form.password, user.get_password_hash()) {
        warn!("Invalid password for user {}", user.get_id());
        return Err(rejected());
    }

    debug!("User {} logged in", user.get_id());
    user_body(&state, &user)
}

/// Handler for retrieving the current user
///
/// This function handles GET requests to `/api/user`.
#[instrument(skip_all, fields(user_id = user.get_id()))]
pub async fn current_user_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserBody>, ApiError> {
    user_body(&state, &user)
}

/// Handler for updating the current user
///
/// This function handles PUT requests to `/api/user`. Absent fields keep
/// their stored values; a new password is re-hashed.
#[instrument(skip_all, fields(user_id = user.get_id()))]
pub async fn update_user_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<UserEnvelope<UserUpdateDto>>,
) -> Result<Json<UserBody>, ApiError> {
    let update = payload.user.resolve(&user)?;

    let password_hash = match &update.password {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };

    let changes = UserChangeset {
        username: Some(update.username),
        email: Some(update.email),
        bio: Some(update.bio),
        image: Some(update.image),
        password_hash,
        updated_at: None,
    };
    let updated = repo::update_user(&state.pool, user.get_id(), changes)?;

    info!("Updated user {}", updated.get_id());
    user_body(&state, &updated)
}
