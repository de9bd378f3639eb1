//! Error types for the conversation orchestrator.

use thiserror::Error;

/// Result type alias for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors a chat turn can surface to the caller.
///
/// Provider failures never appear here — they are recovered inside the
/// orchestrator through the fallback path. What remains is the caller's
/// fault (validation), the merchant's configuration, or the shop being
/// switched off.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Malformed input; rejected before any external call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The shop has disabled the assistant.
    #[error("chat is disabled for this shop")]
    ChatDisabled,

    /// The completion provider is not configured (missing credentials).
    #[error("completion provider not configured")]
    ProviderNotConfigured,
}
