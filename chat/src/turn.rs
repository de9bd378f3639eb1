//! Request and response shapes for one chat turn.

use serde::{Deserialize, Serialize};

use shopchat_catalog::AssistantAction;

use crate::error::{ChatError, Result};

/// Maximum accepted message length, in characters.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// One inbound shopper message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The shopper's message, 1–1000 characters.
    pub message: String,

    /// Widget session id; generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,

    /// Product the widget is currently showing, if any.
    #[serde(default)]
    pub product_id: Option<String>,

    /// Free-form widget context, passed through to the transcript.
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

impl ChatRequest {
    /// Create a request with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            product_id: None,
            context: None,
        }
    }

    /// Set the session id.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the product id.
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    /// Reject malformed input. Runs before any external call.
    pub fn validate(&self) -> Result<()> {
        let len = self.message.chars().count();
        if self.message.trim().is_empty() {
            return Err(ChatError::Validation("message must not be empty".to_string()));
        }
        if len > MAX_MESSAGE_LEN {
            return Err(ChatError::Validation(format!(
                "message too long: {len} characters, max {MAX_MESSAGE_LEN}"
            )));
        }
        Ok(())
    }
}

/// The assistant's reply for one turn.
///
/// The shape is identical for normal, cached, and fallback turns; only the
/// field values differ. `diagnostic` carries error detail on fallback turns
/// and is never a raw provider error body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Reply text.
    pub message: String,

    /// At most one action block.
    pub actions: Option<AssistantAction>,

    /// Session id, echoing the request's or freshly generated.
    pub session_id: String,

    /// Whether the answer came from the response cache.
    pub cached: bool,

    /// Short failure summary on fallback turns.
    pub diagnostic: Option<String>,
}
