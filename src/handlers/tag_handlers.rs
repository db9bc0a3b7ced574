use axum::{
    extract::State,
    Json,
};
use tracing::{instrument, info};

use crate::errors::ApiError;
use crate::repo;
use crate::serializers::TagListBody;
use crate::AppState;

/// Handler for listing all tags
///
/// This function handles GET requests to `/api/tags`.
///
/// ### Arguments
///
/// * `state` - The application state
///
/// ### Returns
///
/// Every tag name in use, sorted
#[instrument(skip(state))]
pub async fn list_tags_handler(
    // Extract the database pool from the application state
    State(state): State<AppState>,
) -> Result<Json<TagListBody>, ApiError> {
    // Call the repository function to list all tags
    let tags = repo::list_tags(&state.pool)
        .map_err(ApiError::Database)?;

    info!("Retrieved {} tags", tags.len());

    Ok(Json(TagListBody {
        tags: tags.iter().map(|tag| tag.get_name().to_string()).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::create_test_user;
    use crate::test_utils::test_state;

    #[tokio::test]
    async fn test_list_tags_handler() {
        let state = test_state();
        let seller = create_test_user(&state.pool, "seller");
        repo::create_item(
            &state.pool,
            seller.get_id(),
            "Tagged thing".to_string(),
            String::new(),
            String::new(),
            &["zeta".to_string(), "alpha".to_string(), "zeta".to_string()],
        )
        .unwrap();

        let Json(body) = list_tags_handler(State(state)).await.unwrap();
        assert_eq!(body.tags, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_list_tags_empty() {
        let Json(body) = list_tags_handler(State(test_state())).await.unwrap();
        assert!(body.tags.is_empty());
    }
}
