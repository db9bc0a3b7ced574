use std::collections::BTreeMap;
use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::models::{Item, User};
use crate::repo::{ItemFilter, ItemUpdate, Page};

pub const USERNAME_MIN: usize = 4;
pub const TEXT_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 8;
pub const BIO_MAX: usize = 1024;
pub const TITLE_MIN: usize = 4;
pub const CONTENT_MAX: usize = 2048;

/// Per-field validation messages, keyed by the JSON field name
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message for `field`; the first message per field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{} {}", k, v)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// JSON body extractor whose rejections render as validation errors on `body`
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(FieldErrors::single("body", rejection.body_text()).into()),
        }
    }
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len == 0 && min > 0 {
        errors.add(field, "can't be blank");
    } else if len < min {
        errors.add(field, format!("is too short (minimum is {} characters)", min));
    } else if len > max {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
}

fn check_username(errors: &mut FieldErrors, username: &str) {
    check_length(errors, "username", username, USERNAME_MIN, TEXT_MAX);
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.add("username", "must contain only letters and digits");
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.is_empty() {
        errors.add("email", "can't be blank");
    } else if !is_valid_email(email) {
        errors.add("email", "is invalid");
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    check_length(errors, "password", password, PASSWORD_MIN, TEXT_MAX);
}

/// Loose address check: one `@`, a non-empty local part and a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) || email.chars().count() > TEXT_MAX {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Accepts absolute http and https URLs with a host
pub fn is_valid_image_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !url.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// `{"user": …}` request envelope
#[derive(Deserialize, Debug)]
pub struct UserEnvelope<T> {
    pub user: T,
}

/// `{"item": …}` request envelope
#[derive(Deserialize, Debug)]
pub struct ItemEnvelope<T> {
    pub item: T,
}

/// `{"comment": …}` request envelope
#[derive(Deserialize, Debug)]
pub struct CommentEnvelope<T> {
    pub comment: T,
}

/// Registration form
///
/// Missing fields deserialize as empty strings so they are reported per field
/// instead of as a malformed body.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegistrationDto {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_username(&mut errors, &self.username);
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

/// Login form
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

impl LoginDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

/// Partial update of the current user
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UserUpdateDto {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// A user update with every field resolved against the stored user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUserUpdate {
    pub username: String,
    pub email: String,
    pub bio: String,
    pub image: Option<String>,
    /// New plain-text password, only when one was supplied
    pub password: Option<String>,
}

impl UserUpdateDto {
    /// Fills absent fields from `user` and validates the result
    ///
    /// An empty `image` clears the stored image.
    pub fn resolve(self, user: &User) -> Result<ValidatedUserUpdate, FieldErrors> {
        let resolved = ValidatedUserUpdate {
            username: self.username.unwrap_or_else(|| user.get_username().to_string()),
            email: self.email.unwrap_or_else(|| user.get_email().to_string()),
            bio: self.bio.unwrap_or_else(|| user.get_bio().to_string()),
            image: match self.image {
                Some(image) if image.is_empty() => None,
                Some(image) => Some(image),
                None => user.get_image().map(str::to_string),
            },
            password: self.password,
        };

        let mut errors = FieldErrors::new();
        check_username(&mut errors, &resolved.username);
        check_email(&mut errors, &resolved.email);
        if let Some(password) = &resolved.password {
            check_password(&mut errors, password);
        }
        if resolved.bio.chars().count() > BIO_MAX {
            errors.add("bio", format!("is too long (maximum is {} characters)", BIO_MAX));
        }
        if let Some(image) = &resolved.image {
            if !is_valid_image_url(image) {
                errors.add("image", "must be an http or https URL");
            }
        }

        errors.into_result().map(|_| resolved)
    }
}

fn check_item_text(errors: &mut FieldErrors, title: &str, description: &str, body: &str) {
    check_length(errors, "title", title, TITLE_MIN, usize::MAX);
    check_length(errors, "description", description, 0, CONTENT_MAX);
    check_length(errors, "body", body, 0, CONTENT_MAX);
}

/// New item form
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateItemDto {
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
}

impl CreateItemDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_item_text(&mut errors, &self.title, &self.description, &self.body);
        errors.into_result()
    }
}

/// Partial item update; `tagList`, when present, replaces the tag set
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateItemDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

impl UpdateItemDto {
    /// Fills absent fields from `item` and validates the result
    pub fn resolve(self, item: &Item) -> Result<ItemUpdate, FieldErrors> {
        let update = ItemUpdate {
            title: self.title.unwrap_or_else(|| item.get_title().to_string()),
            description: self.description.unwrap_or_else(|| item.get_description().to_string()),
            body: self.body.unwrap_or_else(|| item.get_body().to_string()),
            tags: self.tag_list,
        };

        let mut errors = FieldErrors::new();
        check_item_text(&mut errors, &update.title, &update.description, &update.body);
        errors.into_result().map(|_| update)
    }
}

/// New comment form
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CommentDto {
    pub body: String,
}

impl CommentDto {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_length(&mut errors, "body", &self.body, 1, CONTENT_MAX);
        errors.into_result()
    }
}

/// Query string of the item list
///
/// Every value is kept raw so that a bad `limit` or `offset` falls back to the
/// default instead of rejecting the request.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ListItemsQuery {
    pub tag: Option<String>,
    pub seller: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListItemsQuery {
    pub fn filter(&self) -> ItemFilter {
        ItemFilter {
            tag: self.tag.clone(),
            seller: self.seller.clone(),
            favorited: self.favorited.clone(),
        }
    }

    pub fn page(&self) -> Page {
        Page::from_params(self.limit.as_deref(), self.offset.as_deref())
    }
}

/// Query string of the feed, pagination only
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct FeedQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl FeedQuery {
    pub fn page(&self) -> Page {
        Page::from_params(self.limit.as_deref(), self.offset.as_deref())
    }
}
