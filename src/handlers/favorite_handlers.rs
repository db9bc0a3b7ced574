use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{instrument, info};

use crate::auth::AuthUser;
use crate::errors::ApiError;
use crate::repo;
use crate::serializers::ItemBody;
use crate::AppState;

use super::item_handlers::{find_item_view, item_body};

/// Handler for favoriting an item
///
/// This function handles POST requests to `/api/items/{slug}/favorite`.
/// Favoriting an item twice counts once.
#[instrument(skip(state, me), fields(user_id = me.get_id()))]
pub async fn favorite_item_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ItemBody>, ApiError> {
    let view = find_item_view(&state, &slug, Some(me.get_id()), "items")?;

    repo::favorite_item(&state.pool, view.item.get_id(), me.get_id())?;
    info!("User {} favorited item {}", me.get_id(), view.item.get_id());

    // Reload so the count and flag reflect the new favorite
    let view = find_item_view(&state, &slug, Some(me.get_id()), "items")?;
    Ok(item_body(&view))
}

/// Handler for removing a favorite
///
/// This function handles DELETE requests to `/api/items/{slug}/favorite`.
#[instrument(skip(state, me), fields(user_id = me.get_id()))]
pub async fn unfavorite_item_handler(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ItemBody>, ApiError> {
    let view = find_item_view(&state, &slug, Some(me.get_id()), "items")?;

    repo::unfavorite_item(&state.pool, view.item.get_id(), me.get_id())?;

    let view = find_item_view(&state, &slug, Some(me.get_id()), "items")?;
    Ok(item_body(&view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::create_test_user;
    use crate::test_utils::test_state;

    #[tokio::test]
    async fn test_favorite_and_unfavorite() {
        let state = test_state();
        let seller = create_test_user(&state.pool, "seller");
        let buyer = create_test_user(&state.pool, "buyer");
        repo::create_item(&state.pool, seller.get_id(), "Old radio".to_string(), String::new(), String::new(), &[]).unwrap();

        let Json(body) = favorite_item_handler(State(state.clone()), AuthUser(buyer.clone()), Path("old-radio".to_string()))
            .await
            .unwrap();
        assert!(body.item.favorited);
        assert_eq!(body.item.favorites_count, 1);

        // Repeating does not double count
        let Json(body) = favorite_item_handler(State(state.clone()), AuthUser(buyer.clone()), Path("old-radio".to_string()))
            .await
            .unwrap();
        assert_eq!(body.item.favorites_count, 1);

        let Json(body) = unfavorite_item_handler(State(state.clone()), AuthUser(buyer.clone()), Path("old-radio".to_string()))
            .await
            .unwrap();
        assert!(!body.item.favorited);
        assert_eq!(body.item.favorites_count, 0);

        // Unfavoriting again is harmless
        let Json(body) = unfavorite_item_handler(State(state), AuthUser(buyer), Path("old-radio".to_string()))
            .await
            .unwrap();
        assert_eq!(body.item.favorites_count, 0);
    }

    #[tokio::test]
    async fn test_favorite_unknown_item() {
        let state = test_state();
        let buyer = create_test_user(&state.pool, "buyer");

        let result = favorite_item_handler(State(state), AuthUser(buyer), Path("nothing-here".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound { key: "items", .. })));
    }
}
