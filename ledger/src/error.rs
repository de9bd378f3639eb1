//! Error types for the ledger stores.

use thiserror::Error;

use crate::jobs::JobStatus;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in the ledger stores.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Job not found.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Job status transition not allowed.
    #[error("invalid job transition: {from:?} -> {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}
