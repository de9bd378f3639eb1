//! # Server
//!
//! HTTP surface for the shopchat assistant: the chat endpoint, the feed
//! export, settings read, the product webhook consumer, and health.
//!
//! All components are constructed once at startup and injected by
//! reference; handlers are thin adapters from HTTP to the core crates.
//! Request cancellation propagates naturally: when a client disconnects,
//! axum drops the handler future, which aborts any in-flight provider call.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use shopchat_catalog::CatalogClient;
use shopchat_chat::ChatOrchestrator;
use shopchat_embeddings::EmbeddingStore;
use shopchat_ledger::{MetricsLedger, SettingsStore};
use shopchat_pipeline::ContentPipeline;

pub mod config;
pub mod error;
pub mod jsonld;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The conversation orchestrator.
    pub orchestrator: Arc<ChatOrchestrator>,

    /// The content generation pipeline.
    pub pipeline: Arc<ContentPipeline>,

    /// Per-shop settings.
    pub settings: Arc<SettingsStore>,

    /// The embedding store (read by the feed export).
    pub embeddings: Arc<EmbeddingStore>,

    /// Catalog platform access.
    pub catalog: Arc<dyn CatalogClient>,

    /// Daily metrics.
    pub metrics: Arc<MetricsLedger>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/chat", post(routes::chat::chat))
        .route("/settings", get(routes::settings::get_settings))
        .route("/feed.json", get(routes::feed::feed_json))
        .route("/feed.ndjson", get(routes::feed::feed_ndjson))
        .route("/webhooks/products", post(routes::webhooks::products))
        .with_state(state)
}
