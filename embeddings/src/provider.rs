//! Embedding providers.
//!
//! The provider contract is deliberately small: text in, fixed-length float
//! vector out. Every vector in a shop's store must come from the same model,
//! so the provider is constructed once and shared.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Per-request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Total attempts per embed call (1 initial + retries).
const MAX_ATTEMPTS: u32 = 3;

/// Base delay for retry backoff.
const BACKOFF_BASE_MS: u64 = 250;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model used to generate embeddings.
    fn model(&self) -> &str;

    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI-compatible embedding provider.
///
/// Works against the standard `/embeddings` endpoint shape, which both
/// OpenAI and Azure OpenAI deployments expose.
pub struct OpenAiEmbeddings {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Embedding model.
    model: String,
}

impl OpenAiEmbeddings {
    /// Create a new provider reading the API key from the environment.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            model: "text-embedding-ada-002".to_string(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn request_once(&self, api_key: &str, text: &str) -> Result<Embedding> {
        let body = serde_json::json!({
            "input": text,
            "model": self.model,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "API error {status}: {error_text}"
            )));
        }

        let result: EmbeddingsResponse = response.json().await?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))?
            .embedding;

        debug!("Generated embedding with {} dimensions", embedding.len());

        Ok(embedding)
    }
}

impl Default for OpenAiEmbeddings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(EmbeddingError::ProviderNotConfigured)?;

        let mut last_error = EmbeddingError::ProviderNotConfigured;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(backoff_with_jitter(attempt)).await;
            }

            match self.request_once(&api_key, text).await {
                Ok(embedding) => return Ok(embedding),
                Err(err) if is_retryable(&err) => {
                    warn!("embedding attempt {} failed: {err}", attempt + 1);
                    last_error = err;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Whether an error is worth another attempt.
///
/// Transport failures and server-side errors are transient; everything else
/// (bad request, auth, rate limit with its own retry-after contract) is not.
fn is_retryable(err: &EmbeddingError) -> bool {
    match err {
        EmbeddingError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        EmbeddingError::ApiRequest(msg) => msg.contains("API error 5"),
        _ => false,
    }
}

/// Exponential backoff with jitter.
fn backoff_with_jitter(attempt: u32) -> Duration {
    use rand::Rng;

    let base = BACKOFF_BASE_MS * 2u64.pow(attempt.saturating_sub(1));
    let jitter = rand::rng().random_range(0..=BACKOFF_BASE_MS / 2);
    Duration::from_millis(base + jitter)
}

/// Embeddings API response format.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
