//! Settings read endpoint.

use axum::Json;
use axum::extract::{Query, State};

use shopchat_ledger::ShopSettings;

use crate::AppState;
use crate::error::Result;
use crate::routes::{ShopQuery, require_shop};

/// `GET /settings?shop=<id>` — the shop's settings, created with defaults
/// on first read.
pub async fn get_settings(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Result<Json<ShopSettings>> {
    let shop = require_shop(&query)?;
    let settings = state.settings.get_or_create(shop).await;
    Ok(Json(settings))
}
