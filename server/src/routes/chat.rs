//! The chat endpoint.

use axum::Json;
use axum::extract::{Query, State};

use shopchat_chat::{ChatRequest, ChatResponse};

use crate::AppState;
use crate::error::Result;
use crate::routes::{ShopQuery, require_shop};

/// `POST /chat?shop=<id>` — run one assistant turn.
pub async fn chat(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let shop = require_shop(&query)?;
    let response = state.orchestrator.handle(shop, request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::test_state;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_missing_shop_is_rejected() {
        let state = test_state("Hello shopper!");

        let result = chat(
            State(state),
            Query(ShopQuery { shop: None }),
            Json(ChatRequest::new("hi")),
        )
        .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_turn_round_trip() {
        let state = test_state("Hello shopper!");

        let Json(response) = chat(
            State(state),
            Query(ShopQuery {
                shop: Some("shop-a".to_string()),
            }),
            Json(ChatRequest::new("hi there")),
        )
        .await
        .unwrap();

        assert_eq!(response.message, "Hello shopper!");
        assert!(response.actions.is_none());
        assert!(!response.session_id.is_empty());
    }

    #[tokio::test]
    async fn test_validation_error_maps_to_bad_request() {
        let state = test_state("Hello shopper!");

        let result = chat(
            State(state),
            Query(ShopQuery {
                shop: Some("shop-a".to_string()),
            }),
            Json(ChatRequest::new("")),
        )
        .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
