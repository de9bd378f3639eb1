//! Related-product suggestion generation.

use serde::Deserialize;
use tracing::debug;

use shopchat_catalog::RelatedSuggestion;
use shopchat_completions::{ChatMessage, CompletionProvider, CompletionReply, CompletionRequest};

/// Suggestion shape as requested from the provider.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    category: String,
    reason: String,
    overlap_score: f32,
}

/// Generate related-category suggestions from a product's stored features
/// and use cases.
///
/// Soft-fails to an empty list: a provider error or malformed JSON yields
/// no suggestions (and no action upstream), never an error. The raw output
/// is logged at debug level for diagnosis.
pub async fn related_suggestions(
    provider: &dyn CompletionProvider,
    features: &[String],
    use_cases: &[String],
) -> Vec<RelatedSuggestion> {
    let prompt = format!(
        "Given these product features and use cases, suggest 3-5 related \
         product types that would complement this product:\n\n\
         Features: {}\nUse Cases: {}\n\n\
         Return a JSON array of suggestions, each with:\n\
         - category: Product category\n\
         - reason: Why it's related\n\
         - overlap_score: 0-1 score of feature/use-case overlap",
        features.join(", "),
        use_cases.join(", "),
    );

    let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
        .with_temperature(0.5)
        .with_max_tokens(500);

    let text = match provider.complete(request).await {
        Ok(CompletionReply::Text(text)) => text,
        Ok(CompletionReply::FunctionCall(_)) => {
            debug!("related-products generation returned a function call, ignoring");
            return Vec::new();
        }
        Err(err) => {
            debug!("related-products generation failed: {err}");
            return Vec::new();
        }
    };

    let raw: Vec<RawSuggestion> = match serde_json::from_str(&text) {
        Ok(raw) => raw,
        Err(err) => {
            debug!("related-products output was not valid JSON ({err}): {text}");
            return Vec::new();
        }
    };

    raw.into_iter()
        .map(|s| RelatedSuggestion {
            category: s.category,
            reason: s.reason,
            overlap_score: s.overlap_score.clamp(0.0, 1.0),
        })
        .collect()
}
