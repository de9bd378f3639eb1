//! Request and reply types for the completion contract.

use serde::{Deserialize, Serialize};

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions and grounding context.
    System,

    /// The shopper.
    User,

    /// The assistant.
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,

    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A function the model may ask to call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Function name.
    pub name: String,

    /// What the function does.
    pub description: String,

    /// JSON-schema-like parameter description.
    pub parameters: serde_json::Value,
}

impl FunctionDef {
    /// Create a new function definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A request to the completion provider.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,

    /// Functions offered to the model. Empty means text-only.
    pub functions: Vec<FunctionDef>,

    /// Token budget for the reply.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a request from messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Offer functions to the model.
    pub fn with_functions(mut self, functions: Vec<FunctionDef>) -> Self {
        self.functions = functions;
        self
    }

    /// Set the reply token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A function-call intent returned by the model.
///
/// `arguments` is raw JSON text from the provider; treat it as untrusted
/// input and validate before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the requested function.
    pub name: String,

    /// Raw arguments JSON.
    pub arguments: String,
}

/// What the provider returned.
#[derive(Debug, Clone)]
pub enum CompletionReply {
    /// A plain text answer.
    Text(String),

    /// A request to call one function.
    FunctionCall(FunctionCall),
}

impl CompletionReply {
    /// The text content, if this is a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::FunctionCall(_) => None,
        }
    }
}
