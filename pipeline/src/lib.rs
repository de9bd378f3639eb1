//! # Pipeline
//!
//! Webhook-driven content generation: keeps each shop's retrieval index in
//! sync with its catalog.
//!
//! On product create/update the pipeline generates any missing SEO metadata
//! (features, use cases, FAQs) and image alt text, writes both back to the
//! catalog, and refreshes the product's embedding. On delete it removes the
//! embedding. Webhook delivery is at-least-once, so every write is an
//! upsert and replays converge to the same end state.

pub mod error;
pub mod event;
pub mod generator;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use error::{PipelineError, Result};
pub use event::{ProductEvent, ProductEventKind};
pub use generator::SeoGenerator;
pub use pipeline::ContentPipeline;
