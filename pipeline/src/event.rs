//! Catalog webhook events.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Kind of product event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductEventKind {
    /// Product was created.
    Created,

    /// Product was updated.
    Updated,

    /// Product was deleted.
    Deleted,
}

/// A parsed product webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEvent {
    /// The kind of event.
    pub kind: ProductEventKind,

    /// The affected product id.
    pub product_id: String,
}

impl ProductEvent {
    /// Create an event directly.
    pub fn new(kind: ProductEventKind, product_id: impl Into<String>) -> Self {
        Self {
            kind,
            product_id: product_id.into(),
        }
    }

    /// Parse a webhook delivery from its topic string and JSON payload.
    ///
    /// Topics have the form `products/<create|update|delete>`; anything else
    /// is rejected. The payload carries the entity id as `{id}` — the
    /// platform sends it numeric, replays from tooling send it as a string,
    /// so both are accepted.
    pub fn from_webhook(topic: &str, payload: &serde_json::Value) -> Result<Self> {
        let kind = match topic {
            "products/create" => ProductEventKind::Created,
            "products/update" => ProductEventKind::Updated,
            "products/delete" => ProductEventKind::Deleted,
            other => return Err(PipelineError::InvalidTopic(other.to_string())),
        };

        let product_id = match payload.get("id") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(PipelineError::MalformedPayload(
                    "missing or empty id".to_string(),
                ));
            }
        };

        Ok(Self { kind, product_id })
    }
}
