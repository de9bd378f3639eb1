//! Catalog platform data shapes.
//!
//! These mirror the storefront platform's product/policy contract; nothing
//! here knows how the data is fetched.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopchat_embeddings::FaqEntry;

use crate::error::CatalogError;

/// A product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    /// Platform image id.
    pub id: String,

    /// Public URL.
    pub url: String,

    /// Alt text, if set.
    pub alt_text: Option<String>,
}

/// A purchasable product variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Platform variant id.
    pub id: String,

    /// Variant title (e.g. "Medium / Blue").
    pub title: String,

    /// Price as a decimal string, the way the platform reports money.
    pub price: String,

    /// ISO currency code.
    pub currency: String,

    /// Whether the variant can currently be bought.
    pub available_for_sale: bool,

    /// Stock keeping unit.
    pub sku: Option<String>,
}

/// Product listing status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Visible in the storefront.
    #[default]
    Active,

    /// Not yet published.
    Draft,

    /// Removed from sale.
    Archived,
}

/// Generated SEO metadata attached to a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedMetadata {
    /// Key product features.
    pub features: Vec<String>,

    /// Use cases or scenarios.
    pub use_cases: Vec<String>,

    /// FAQ pairs.
    pub faqs: Vec<FaqEntry>,
}

impl GeneratedMetadata {
    /// Whether every section is present and non-empty.
    ///
    /// A product missing any of the three needs a generation pass.
    pub fn is_complete(&self) -> bool {
        !self.features.is_empty() && !self.use_cases.is_empty() && !self.faqs.is_empty()
    }
}

/// A point-in-time snapshot of one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Platform product id.
    pub id: String,

    /// Product title.
    pub title: String,

    /// Long-form description.
    pub description: Option<String>,

    /// URL handle.
    pub handle: String,

    /// Product type / category.
    pub product_type: Option<String>,

    /// Vendor / brand.
    pub vendor: Option<String>,

    /// Listing status.
    pub status: ProductStatus,

    /// Images, in display order.
    pub images: Vec<ProductImage>,

    /// Variants, in display order.
    pub variants: Vec<ProductVariant>,

    /// Generated SEO metadata, if any.
    pub metadata: GeneratedMetadata,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ProductSnapshot {
    /// Create a minimal snapshot with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        let title: String = title.into();
        let handle = title.to_lowercase().replace(' ', "-");
        let now = Utc::now();
        Self {
            id,
            title,
            description: None,
            handle,
            product_type: None,
            vendor: None,
            status: ProductStatus::Active,
            images: Vec::new(),
            variants: Vec::new(),
            metadata: GeneratedMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an image.
    pub fn with_image(mut self, image: ProductImage) -> Self {
        self.images.push(image);
        self
    }

    /// Add a variant.
    pub fn with_variant(mut self, variant: ProductVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Set the generated metadata.
    pub fn with_metadata(mut self, metadata: GeneratedMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Well-known shop policy slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySlug {
    /// Shipping policy.
    Shipping,

    /// Returns / refunds policy.
    Returns,

    /// Warranty policy.
    Warranty,

    /// Privacy policy.
    Privacy,
}

impl FromStr for PolicySlug {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shipping" => Ok(Self::Shipping),
            "returns" | "refund" => Ok(Self::Returns),
            "warranty" => Ok(Self::Warranty),
            "privacy" => Ok(Self::Privacy),
            other => Err(CatalogError::UnknownPolicySlug(other.to_string())),
        }
    }
}

impl std::fmt::Display for PolicySlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shipping => write!(f, "shipping"),
            Self::Returns => write!(f, "returns"),
            Self::Warranty => write!(f, "warranty"),
            Self::Privacy => write!(f, "privacy"),
        }
    }
}

/// A shop policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Which policy this is.
    pub slug: PolicySlug,

    /// Display title.
    pub title: String,

    /// Policy body text.
    pub content: String,
}
