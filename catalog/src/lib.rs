//! # Catalog
//!
//! Data contract for the catalog platform, plus the closed set of actions
//! the assistant can emit.
//!
//! The real storefront platform is an external collaborator; only its data
//! shapes are modeled here. [`client::CatalogClient`] is the seam the rest
//! of the system talks through, and [`client::InMemoryCatalog`] is the
//! implementation used by tests and demos.

pub mod actions;
pub mod client;
pub mod error;
pub mod types;

pub use actions::{AssistantAction, RelatedSuggestion};
pub use client::{CatalogClient, InMemoryCatalog};
pub use error::{CatalogError, Result};
pub use types::{
    GeneratedMetadata, Policy, PolicySlug, ProductImage, ProductSnapshot, ProductStatus,
    ProductVariant,
};
