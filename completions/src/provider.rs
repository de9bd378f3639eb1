//! Completion providers.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CompletionError, Result};
use crate::message::{CompletionReply, CompletionRequest, FunctionCall};

/// Per-request timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Total attempts per completion call (1 initial + retries).
const MAX_ATTEMPTS: u32 = 3;

/// Base delay for retry backoff.
const BACKOFF_BASE_MS: u64 = 500;

/// Trait for completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Run one completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply>;

    /// Check if the provider is available (API key set, etc.).
    fn is_available(&self) -> bool;
}

/// OpenAI-compatible chat completion provider.
///
/// Works against the standard `/chat/completions` endpoint shape, with the
/// legacy `functions`/`function_call` fields the assistant contract uses.
pub struct OpenAiChat {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Chat model.
    model: String,
}

impl OpenAiChat {
    /// Create a new provider reading the API key from the environment.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            model: "gpt-4".to_string(),
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

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn request_once(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionReply> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": request.messages,
        });

        if !request.functions.is_empty() {
            body["functions"] = serde_json::to_value(&request.functions)?;
            body["function_call"] = serde_json::json!("auto");
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
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

            return Err(CompletionError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::ApiRequest(format!(
                "API error {status}: {error_text}"
            )));
        }

        let result: ChatCompletionsResponse = response.json().await?;

        let message = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::InvalidResponse("no choices in response".to_string()))?
            .message;

        if let Some(call) = message.function_call {
            debug!("Provider proposed function call: {}", call.name);
            return Ok(CompletionReply::FunctionCall(FunctionCall {
                name: call.name,
                arguments: call.arguments,
            }));
        }

        match message.content {
            Some(content) => Ok(CompletionReply::Text(content)),
            None => Err(CompletionError::InvalidResponse(
                "neither content nor function call in response".to_string(),
            )),
        }
    }
}

impl Default for OpenAiChat {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for OpenAiChat {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(CompletionError::ProviderNotConfigured)?;

        let mut last_error = CompletionError::ProviderNotConfigured;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(backoff_with_jitter(attempt)).await;
            }

            match self.request_once(&api_key, &request).await {
                Ok(reply) => return Ok(reply),
                Err(err) if is_retryable(&err) => {
                    warn!("completion attempt {} failed: {err}", attempt + 1);
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
fn is_retryable(err: &CompletionError) -> bool {
    match err {
        CompletionError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        CompletionError::ApiRequest(msg) => msg.contains("API error 5"),
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

/// Chat completions API response format.
#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    function_call: Option<RawFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct RawFunctionCall {
    name: String,
    arguments: String,
}
