use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Query;
use serde_json::{json, Value};
use tracing::{instrument, debug, info, warn};

use crate::auth::{AuthUser, MaybeUser};
use crate::errors::ApiError;
use crate::models::User;
use crate::repo::{self, ItemView};
use crate::serializers::{ItemBody, ItemListBody, ItemResponse};
use crate::validators::{AppJson, CreateItemDto, FeedQuery, ItemEnvelope, ListItemsQuery, UpdateItemDto};
use crate::AppState;

/// Loads the live item behind `slug` as seen by `viewer_id`
///
/// A missing item is reported as `{"<key>":"Invalid slug"}`.
pub(crate) fn find_item_view(
    state: &AppState,
    slug: &str,
    viewer_id: Option<i32>,
    key: &'static str,
) -> Result<ItemView, ApiError> {
    repo::get_item_view(&state.pool, slug, viewer_id)?.ok_or(ApiError::not_found(key, "Invalid slug"))
}

/// Loads an item and checks that `me` is its seller
fn find_own_item(state: &AppState, slug: &str, me: &User) -> Result<ItemView, ApiError> {
    let view = find_item_view(state, slug, Some(me.get_id()), "items")?;
    if view.seller.get_id() != me.get_id() {
        warn!("User {} tried to modify item {} of another seller", me.get_id(), view.item.get_id());
        return Err(ApiError::forbidden("items", "Only the seller can modify this item"));
    }
    Ok(view)
}

pub(crate) fn item_body(view: &ItemView) -> Json<ItemBody> {
    Json(ItemBody {
        item: ItemResponse::from(view),
    })
}

/// Handler for creating a new item
///
/// This function handles POST requests to `/api/items`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `me` - The logged-in seller
/// * `payload` - `{"item":{title,description,body,tagList}}`
///
/// ### Returns
///
/// 201 with the created item
#[instrument(skip(state, me, payload), fields(seller_id = me.get_id(), title = %payload.item.title))]
pub async fn create_item_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    AppJson(payload): AppJson<ItemEnvelope<CreateItemDto>>,
) -> Result<(StatusCode, Json<ItemBody>), ApiError> {
    let form = payload.item;
    form.validate()?;

    let item = repo::create_item(
        &state.pool,
        me.get_id(),
        form.title,
        form.description,
        form.body,
        &form.tag_list,
    )?;
    info!("Created item {} with slug {}", item.get_id(), item.get_slug());

    let view = find_item_view(&state, item.get_slug().as_str(), Some(me.get_id()), "items")?;
    Ok((StatusCode::CREATED, item_body(&view)))
}

/// Handler for retrieving a single item
///
/// This function handles GET requests to `/api/items/{slug}`.
#[instrument(skip(state, viewer))]
pub async fn get_item_handler(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<ItemBody>, ApiError> {
    let view = find_item_view(&state, &slug, viewer.id(), "items")?;
    Ok(item_body(&view))
}

/// Handler for updating an item
///
/// This function handles PUT requests to `/api/items/{slug}`. Only the seller
/// may update; absent fields keep their stored values and a changed title
/// moves the item to a new slug.
#[instrument(skip(state, me, payload), fields(user_id = me.get_id()))]
pub async fn update_item_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<ItemEnvelope<UpdateItemDto>>,
) -> Result<Json<ItemBody>, ApiError> {
    let current = find_own_item(&state, &slug, &me)?;
    let update = payload.item.resolve(&current.item)?;

    let item = repo::update_item(&state.pool, current.item.get_id(), update)?;
    debug!("Item {} now has slug {}", item.get_id(), item.get_slug());

    let view = find_item_view(&state, item.get_slug().as_str(), Some(me.get_id()), "items")?;
    Ok(item_body(&view))
}

/// Handler for deleting an item
///
/// This function handles DELETE requests to `/api/items/{slug}`. Comments
/// and favorites go with it.
#[instrument(skip(state, me), fields(user_id = me.get_id()))]
pub async fn delete_item_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let current = find_own_item(&state, &slug, &me)?;
    repo::delete_item(&state.pool, current.item.get_id())?;

    info!("Deleted item {}", current.item.get_id());
    Ok(Json(json!({ "item": "Delete success" })))
}

/// Handler for listing items
///
/// This function handles GET requests to `/api/items`.
///
/// ### Arguments
///
/// * `query` - Optional `tag`, `seller`, `favorited`, `limit` and `offset`;
///   only the first non-empty filter of tag, seller and favorited applies
///
/// ### Returns
///
/// The page of items, newest first, and the total number of matches
#[instrument(skip(state, viewer))]
pub async fn list_items_handler(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ItemListBody>, ApiError> {
    let (views, count) = repo::list_items(&state.pool, &query.filter(), query.page(), viewer.id())?;
    debug!("Listing {} of {} items", views.len(), count);
    Ok(Json(ItemListBody::new(&views, count)))
}

/// Handler for the personal feed
///
/// This function handles GET requests to `/api/items/feed`: items of sellers
/// the caller follows, most recently updated first.
#[instrument(skip(state, me), fields(user_id = me.get_id()))]
pub async fn feed_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ItemListBody>, ApiError> {
    let (views, count) = repo::item_feed(&state.pool, me.get_id(), query.page())?;
    Ok(Json(ItemListBody::new(&views, count)))
}
