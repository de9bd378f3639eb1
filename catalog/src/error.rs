//! Error types for catalog access.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur talking to the catalog platform.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Platform API call failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Unknown policy slug.
    #[error("unknown policy slug: {0}")]
    UnknownPolicySlug(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
