//! Canned replies for provider failures.

use std::sync::Arc;

/// The fixed table of apologetic responses used when the completion
/// provider is unreachable. The turn still succeeds from the caller's point
/// of view; one of these becomes the reply text.
pub const FALLBACK_RESPONSES: [&str; 3] = [
    "Hey there! I'm having trouble connecting right now, but I'd love to help \
     you with anything about our store. What can I tell you about?",
    "Sorry, I couldn't reach my knowledge base just now. Please try again in a \
     moment — I'm happy to help with products, sizing, shipping and returns.",
    "Apologies, something went wrong on my end. Ask me again in a bit, or \
     browse the store while I catch my breath!",
];

/// Picks an index into a table of the given length.
///
/// Injectable so tests can make the selection deterministic.
pub type FallbackChooser = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// The production chooser: uniform random.
pub fn random_chooser() -> FallbackChooser {
    Arc::new(|len| {
        use rand::Rng;
        rand::rng().random_range(0..len)
    })
}

/// A chooser that always picks the given index (for tests).
pub fn fixed_chooser(index: usize) -> FallbackChooser {
    Arc::new(move |len| index.min(len - 1))
}

/// Pick a fallback response with the given chooser.
pub fn pick(chooser: &FallbackChooser) -> &'static str {
    let index = chooser(FALLBACK_RESPONSES.len()).min(FALLBACK_RESPONSES.len() - 1);
    FALLBACK_RESPONSES[index]
}
