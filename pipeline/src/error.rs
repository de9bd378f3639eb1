//! Error types for the content generation pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors a webhook delivery can fail with.
///
/// Generation and per-image failures are soft (logged and skipped); what
/// surfaces here is worth a redelivery from the platform.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Topic is not a product create/update/delete.
    #[error("invalid webhook topic: {0}")]
    InvalidTopic(String),

    /// Payload is missing the entity id.
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    /// The referenced product no longer exists in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Catalog platform call failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] shopchat_catalog::CatalogError),

    /// Embedding refresh failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] shopchat_embeddings::EmbeddingError),
}
