//! # Completions
//!
//! Completion provider contract for the shopchat assistant.
//!
//! A completion request is an ordered list of role/content messages plus an
//! optional set of function definitions. The reply is either plain text or a
//! single function-call intent (`{name, argumentsJSON}`); the arguments are
//! untrusted text that callers must validate before acting on.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{CompletionError, Result};
pub use message::{
    ChatMessage, CompletionReply, CompletionRequest, FunctionCall, FunctionDef, Role,
};
pub use provider::{CompletionProvider, OpenAiChat};
