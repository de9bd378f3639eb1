//! Catalog webhook consumer.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use tracing::info;

use shopchat_pipeline::ProductEvent;

use crate::AppState;
use crate::error::{ApiError, Result};
use crate::routes::{ShopQuery, require_shop};

/// Header carrying the webhook topic, the way the platform signs it.
const TOPIC_HEADER: &str = "x-webhook-topic";

/// `POST /webhooks/products?shop=<id>` — consume one product event.
///
/// Delivery is at-least-once; the pipeline makes replays converge, so a
/// duplicate is answered 200 just like the first copy.
pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Result<StatusCode> {
    let shop = require_shop(&query)?;

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing X-Webhook-Topic header".to_string()))?;

    let event = ProductEvent::from_webhook(topic, &payload)?;
    info!("webhook {topic} for {shop}/{}", event.product_id);

    state.pipeline.handle_event(shop, &event).await?;
    Ok(StatusCode::OK)
}
