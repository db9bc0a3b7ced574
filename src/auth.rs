//! Passwords, tokens and the request-level identity of the caller.
//!
//! Every request passes through [`authenticate`], which resolves the token (if
//! any) into a [`CurrentUser`] extension. Handlers then pick [`AuthUser`] when
//! a login is mandatory or [`MaybeUser`] when it only personalises the answer.

use anyhow::{Result, anyhow};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::{HeaderMap, Uri};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::AppState;
use crate::errors::ApiError;
use crate::models::User;
use crate::repo;

/// Hashes a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
        .map_err(|e| anyhow!("Failed to encode salt: {}", e))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored PHC hash string
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Token payload: the user id plus issue and expiry times in seconds
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing material and token lifetime
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Signs a fresh token for `user_id`
    pub fn issue(&self, user_id: i32) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Checks signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[derive(Deserialize, Debug, Default)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Pulls the raw token from `Authorization: Token …`/`Bearer …` or the
/// `access_token` query parameter, in that order
fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Token ")
                .or_else(|| value.strip_prefix("Bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        let Query(query) = Query::<TokenQuery>::try_from_uri(uri)
            .inspect_err(|e| debug!("Ignoring unreadable query string: {}", e))
            .ok()?;
        query.access_token.filter(|token| !token.is_empty())
    })
}

/// The caller as resolved by [`authenticate`]; `None` for anonymous requests
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Resolves the caller of every request and stores it as [`CurrentUser`]
///
/// A missing, expired or forged token, or one naming a user that no longer
/// exists, leaves the request anonymous. Rejection happens later in the
/// [`AuthUser`] extractor.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let user = match extract_token(req.headers(), req.uri()) {
        Some(token) => resolve_user(&state, &token),
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

fn resolve_user(state: &AppState, token: &str) -> Option<User> {
    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Ignoring invalid token: {}", e);
            return None;
        }
    };

    match repo::get_user(&state.pool, claims.sub) {
        Ok(user) => user,
        Err(e) => {
            warn!("Failed to load user {} for token: {}", claims.sub, e);
            None
        }
    }
}

/// A logged-in caller; anonymous requests are rejected with 401
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(CurrentUser(Some(user))) => Ok(AuthUser(user.clone())),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// The caller if one is logged in
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(User::get_id)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .and_then(|current| current.0.clone());
        Ok(MaybeUser(user))
    }
}
