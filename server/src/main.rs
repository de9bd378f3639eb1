//! shopchat server binary.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shopchat_catalog::{CatalogClient, InMemoryCatalog};
use shopchat_chat::ChatOrchestrator;
use shopchat_completions::{CompletionProvider, OpenAiChat};
use shopchat_embeddings::{EmbeddingStore, OpenAiEmbeddings};
use shopchat_ledger::{JobLedger, MetricsLedger, ResponseCache, SettingsStore, TranscriptStore};
use shopchat_pipeline::ContentPipeline;
use shopchat_server::{AppState, ServerConfig, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Providers and stores are constructed once and shared by reference;
    // nothing reaches them through globals.
    let mut embeddings_provider = OpenAiEmbeddings::new()
        .with_base_url(config.api_base_url.clone())
        .with_model(config.embedding_model.clone());
    let mut chat_provider = OpenAiChat::new()
        .with_base_url(config.api_base_url.clone())
        .with_model(config.chat_model.clone());
    if let Some(ref key) = config.api_key {
        embeddings_provider = embeddings_provider.with_api_key(key);
        chat_provider = chat_provider.with_api_key(key);
    }
    let completions: Arc<dyn CompletionProvider> = Arc::new(chat_provider);

    // The platform GraphQL client is wired in by the integration layer; the
    // in-memory catalog stands in until then.
    let catalog: Arc<dyn CatalogClient> = Arc::new(InMemoryCatalog::new());

    let settings = Arc::new(SettingsStore::new());
    let cache = Arc::new(ResponseCache::new());
    let embeddings = Arc::new(EmbeddingStore::new(Arc::new(embeddings_provider)));
    let metrics = Arc::new(MetricsLedger::new());
    let transcripts = Arc::new(TranscriptStore::new());
    let jobs = Arc::new(JobLedger::new());

    let orchestrator = Arc::new(ChatOrchestrator::new(
        Arc::clone(&settings),
        Arc::clone(&cache),
        Arc::clone(&embeddings),
        Arc::clone(&completions),
        Arc::clone(&catalog),
        Arc::clone(&metrics),
        Arc::clone(&transcripts),
    ));

    let pipeline = Arc::new(ContentPipeline::new(
        Arc::clone(&catalog),
        Arc::clone(&completions),
        Arc::clone(&embeddings),
        Arc::clone(&metrics),
        Arc::clone(&jobs),
    ));

    let state = AppState {
        orchestrator,
        pipeline,
        settings,
        embeddings,
        catalog,
        metrics,
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("shopchat server listening on {}", config.bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
