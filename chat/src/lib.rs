//! # Chat
//!
//! The conversation orchestrator: one inbound shopper message in, one reply
//! (and at most one action) out.
//!
//! Each turn runs the same machine:
//!
//! ```text
//! RECEIVED -> CACHE_CHECK -> CONTEXT_BUILD -> COMPLETION_CALL
//!     -> [ACTION_DISPATCH] -> RESPOND
//!     -> CACHE_WRITE -> METRIC_RECORD -> TRANSCRIPT_WRITE? -> DONE
//! ```
//!
//! A provider failure at any point short-circuits to a canned fallback
//! reply; the caller always gets a well-formed response.

pub mod error;
pub mod fallback;
pub mod functions;
pub mod orchestrator;
pub mod related;
pub mod turn;

#[cfg(test)]
mod test_support;

pub use error::{ChatError, Result};
pub use fallback::{FALLBACK_RESPONSES, FallbackChooser, random_chooser};
pub use orchestrator::ChatOrchestrator;
pub use turn::{ChatRequest, ChatResponse, MAX_MESSAGE_LEN};
