//! The closed set of actions the assistant can emit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Policy, ProductSnapshot};

/// A related-product suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedSuggestion {
    /// Suggested product category.
    pub category: String,

    /// Why it complements the current product.
    pub reason: String,

    /// Feature/use-case overlap in [0, 1].
    pub overlap_score: f32,
}

/// An action block attached to an assistant reply.
///
/// This is a closed union: every consumer matches exhaustively, and the
/// orchestrator can only produce these five shapes. `AddToCart` is an intent
/// descriptor — the storefront surface performs the actual cart mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AssistantAction {
    /// A product lookup result.
    ProductInfo {
        /// The product snapshot.
        product: ProductSnapshot,
    },

    /// Related-category suggestions.
    RelatedProducts {
        /// Ranked suggestions.
        suggestions: Vec<RelatedSuggestion>,
    },

    /// A policy excerpt.
    PolicyInfo {
        /// The policy document.
        policy: Policy,
    },

    /// A cart-intent descriptor. Emitted, never executed, by the core.
    AddToCart {
        /// Variant to add.
        variant_id: String,

        /// Quantity, at least 1.
        quantity: u32,
    },

    /// A size recommendation.
    SizeRecommendation {
        /// Product the recommendation is for.
        product_id: String,

        /// Measurements the shopper supplied, if any.
        measurements: Option<HashMap<String, f64>>,

        /// The recommendation text.
        recommendation: String,
    },
}
