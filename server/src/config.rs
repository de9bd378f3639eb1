//! Environment-derived server configuration.

use std::net::SocketAddr;

use crate::error::{ApiError, Result};

/// Configuration read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Provider API key. Absent means the assistant answers with a
    /// configuration error until it is set.
    pub api_key: Option<String>,

    /// Provider base URL (OpenAI-compatible).
    pub api_base_url: String,

    /// Chat completion model/deployment.
    pub chat_model: String,

    /// Embedding model/deployment.
    pub embedding_model: String,
}

impl ServerConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("SHOPCHAT_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| ApiError::Internal(format!("invalid SHOPCHAT_BIND_ADDR: {e}")))?;

        Ok(Self {
            bind_addr,
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            api_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            chat_model: std::env::var("SHOPCHAT_CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-4".to_string()),
            embedding_model: std::env::var("SHOPCHAT_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-ada-002".to_string()),
        })
    }
}
