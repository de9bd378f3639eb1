//! SEO metadata and alt-text generation.
//!
//! Everything the provider returns is untrusted: structured output is
//! parsed and schema-checked, and anything malformed becomes a soft "no
//! result" with the raw text logged for diagnosis. Nothing in here throws
//! past the pipeline.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use shopchat_catalog::{GeneratedMetadata, ProductSnapshot};
use shopchat_completions::{ChatMessage, CompletionProvider, CompletionReply, CompletionRequest};
use shopchat_embeddings::FaqEntry;

/// Hard cap on alt text length, per accessibility guidance.
const MAX_ALT_TEXT_LEN: usize = 125;

/// Generates product SEO metadata and image alt text.
pub struct SeoGenerator {
    provider: Arc<dyn CompletionProvider>,
}

/// Generation output shape requested from the provider.
#[derive(Debug, Deserialize)]
struct RawSeo {
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    use_cases: Vec<String>,
    #[serde(default)]
    faqs: Vec<RawFaq>,
}

#[derive(Debug, Deserialize)]
struct RawFaq {
    q: String,
    a: String,
}

impl SeoGenerator {
    /// Create a generator over a completion provider.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Generate features, use cases and FAQs for a product.
    ///
    /// Returns `None` on provider failure or malformed/schema-violating
    /// output; the caller leaves the product untouched in that case.
    pub async fn generate_product_seo(
        &self,
        product: &ProductSnapshot,
    ) -> Option<GeneratedMetadata> {
        let prompt = format!(
            "Generate SEO content for this product:\n\n\
             Product: {}\n\
             Description: {}\n\
             Type: {}\n\
             Vendor: {}\n\n\
             Generate the following in JSON format:\n\
             1. features: Array of 3-5 key product features\n\
             2. use_cases: Array of 3-5 use cases or scenarios\n\
             3. faqs: Array of 5-8 FAQ objects with \"q\" (question) and \"a\" (answer) fields\n\n\
             Focus on being helpful, accurate, and avoiding medical/financial claims.",
            product.title,
            product.description.as_deref().unwrap_or("No description provided"),
            product.product_type.as_deref().unwrap_or("General"),
            product.vendor.as_deref().unwrap_or("Unknown"),
        );

        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(0.7)
            .with_max_tokens(2000);

        let text = match self.provider.complete(request).await {
            Ok(CompletionReply::Text(text)) => text,
            Ok(CompletionReply::FunctionCall(_)) => {
                warn!("SEO generation returned a function call for {}", product.id);
                return None;
            }
            Err(err) => {
                warn!("SEO generation failed for {}: {err}", product.id);
                return None;
            }
        };

        let raw: RawSeo = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("SEO output for {} was not valid JSON ({err}): {text}", product.id);
                return None;
            }
        };

        let metadata = GeneratedMetadata {
            features: clean_strings(raw.features),
            use_cases: clean_strings(raw.use_cases),
            faqs: raw
                .faqs
                .into_iter()
                .filter(|faq| !faq.q.trim().is_empty() && !faq.a.trim().is_empty())
                .map(|faq| FaqEntry { q: faq.q, a: faq.a })
                .collect(),
        };

        // Shape check: every section must have content. The 3-5/5-8 count
        // ranges are prompt guidance, not validation.
        if !metadata.is_complete() {
            debug!("SEO output for {} was schema-incomplete: {text}", product.id);
            return None;
        }

        Some(metadata)
    }

    /// Generate a short descriptive alt text for one product image.
    ///
    /// Returns `None` on failure; output longer than 125 characters is
    /// truncated at a word boundary.
    pub async fn generate_alt_text(&self, image_url: &str, product_title: &str) -> Option<String> {
        let prompt = format!(
            "Generate a concise, descriptive alt text for this product image.\n\
             Product: {product_title}\n\
             Image URL: {image_url}\n\
             Focus on key visual elements, colors, and product features. \
             Keep it under 125 characters."
        );

        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(0.3)
            .with_max_tokens(100);

        let text = match self.provider.complete(request).await {
            Ok(CompletionReply::Text(text)) => text,
            Ok(CompletionReply::FunctionCall(_)) => return None,
            Err(err) => {
                warn!("alt text generation failed for {image_url}: {err}");
                return None;
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(truncate_at_word(trimmed, MAX_ALT_TEXT_LEN))
    }
}

fn clean_strings(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Truncate to at most `max` characters, backing up to the previous word.
fn truncate_at_word(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max).collect();
    match truncated.rfind(' ') {
        Some(space) => truncated[..space].to_string(),
        None => truncated,
    }
}
