use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::validators::FieldErrors;

/// Every failure a handler can report
///
/// All variants render as `{"errors":{<key>:<message>}}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("{key}: {message}")]
    NotFound { key: &'static str, message: &'static str },
    #[error("Require auth!")]
    Unauthorized,
    #[error("{key}: {message}")]
    Forbidden { key: &'static str, message: &'static str },
}

impl ApiError {
    pub fn not_found(key: &'static str, message: &'static str) -> Self {
        ApiError::NotFound { key, message }
    }

    pub fn forbidden(key: &'static str, message: &'static str) -> Self {
        ApiError::Forbidden { key, message }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::Validation(fields) => {
                warn!("Rejected request: {}", fields);
                (StatusCode::UNPROCESSABLE_ENTITY, json!(fields))
            }
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "database": err.to_string() }))
            }
            ApiError::NotFound { key, message } => (StatusCode::NOT_FOUND, json!({ key: message })),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "auth": "Require auth!" })),
            ApiError::Forbidden { key, message } => (StatusCode::FORBIDDEN, json!({ key: message })),
        };

        (status, Json(json!({ "errors": errors }))).into_response()
    }
}
