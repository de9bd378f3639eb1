//! Feed export: paginated JSON and streaming NDJSON, with JSON-LD.

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use shopchat_catalog::GeneratedMetadata;
use shopchat_embeddings::{EntityEmbedding, EntityKind};

use crate::AppState;
use crate::error::{ApiError, Result};
use crate::jsonld;

/// Upper bound on page size.
const MAX_LIMIT: usize = 100;

/// Default page size.
const DEFAULT_LIMIT: usize = 50;

/// Query parameters for the feed endpoints.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// The shop identifier.
    pub shop: Option<String>,

    /// 1-based page number (JSON variant only).
    pub page: Option<usize>,

    /// Page size, capped at 100 (JSON variant only).
    pub limit: Option<usize>,
}

fn require_shop(query: &FeedQuery) -> Result<&str> {
    query
        .shop
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing shop parameter".to_string()))
}

/// `GET /feed.json?shop=<id>&page=&limit=` — paginated feed with JSON-LD.
pub async fn feed_json(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse> {
    let shop = require_shop(&query)?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = (page - 1) * limit;

    let rows = product_rows(&state, shop).await;
    let total = rows.len();

    let mut entries = Vec::new();
    for row in rows.into_iter().skip(offset).take(limit) {
        if let Some(entry) = feed_entry(&state, shop, &row).await {
            entries.push(entry);
        }
    }

    state
        .metrics
        .record(
            shop,
            "feed_hits",
            1.0,
            Some(json!({"format": "json", "page": page, "limit": limit})),
        )
        .await;

    let total_pages = total.div_ceil(limit);
    let body = json!({
        "products": entries,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages,
            "hasNext": page * limit < total,
            "hasPrev": page > 1,
        },
        "meta": {
            "generatedAt": Utc::now(),
            "shop": shop,
            "format": "json",
        },
    });

    Ok((cache_headers(), Json(body)))
}

/// `GET /feed.ndjson?shop=<id>` — the same entries, one JSON object per
/// line, streamed.
pub async fn feed_ndjson(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Response> {
    let shop = require_shop(&query)?;

    let rows = product_rows(&state, shop).await;
    let total = rows.len();

    let mut lines = vec![
        format!("# AI feed - {shop}"),
        format!("# Generated at: {}", Utc::now().to_rfc3339()),
        format!("# Total products: {total}"),
    ];
    for row in &rows {
        if let Some(entry) = feed_entry(&state, shop, row).await {
            lines.push(entry.to_string());
        }
    }

    state
        .metrics
        .record(
            shop,
            "feed_hits",
            1.0,
            Some(json!({"format": "ndjson", "totalProducts": total})),
        )
        .await;

    let stream = tokio_stream::iter(
        lines
            .into_iter()
            .map(|line| Ok::<Bytes, std::convert::Infallible>(Bytes::from(line + "\n"))),
    );

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .header(header::LAST_MODIFIED, http_date())
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))
}

async fn product_rows(state: &AppState, shop: &str) -> Vec<EntityEmbedding> {
    state
        .embeddings
        .list_all(shop)
        .await
        .into_iter()
        .filter(|row| row.kind == EntityKind::Product)
        .collect()
}

/// Build one feed entry: catalog snapshot enriched with generated metadata
/// and JSON-LD. Rows whose product vanished from the catalog are skipped.
async fn feed_entry(state: &AppState, shop: &str, row: &EntityEmbedding) -> Option<Value> {
    let product = state
        .catalog
        .get_product(shop, &row.entity_id)
        .await
        .ok()??;

    // Prefer the catalog's metadata; fall back to what the index stored.
    let metadata = if product.metadata.is_complete() {
        product.metadata.clone()
    } else {
        GeneratedMetadata {
            features: row.features.clone(),
            use_cases: row.use_cases.clone(),
            faqs: row.faqs.clone(),
        }
    };

    let jsonld = jsonld::for_product(shop, &product, &metadata);

    Some(json!({
        "id": product.id,
        "title": product.title,
        "description": product.description,
        "handle": product.handle,
        "productType": product.product_type,
        "vendor": product.vendor,
        "status": product.status,
        "createdAt": product.created_at,
        "updatedAt": product.updated_at,
        "features": metadata.features,
        "useCases": metadata.use_cases,
        "faqs": metadata.faqs,
        "jsonLd": jsonld,
        "images": product.images,
        "variants": product.variants,
    }))
}

fn cache_headers() -> [(header::HeaderName, String); 2] {
    [
        (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        (header::LAST_MODIFIED, http_date()),
    ]
}

fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
