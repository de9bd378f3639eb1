//! Wiring helpers for handler tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use shopchat_catalog::{CatalogClient, InMemoryCatalog};
use shopchat_chat::ChatOrchestrator;
use shopchat_chat::fallback::fixed_chooser;
use shopchat_completions::{
    CompletionError, CompletionProvider, CompletionReply, CompletionRequest,
};
use shopchat_embeddings::provider::EmbeddingProvider;
use shopchat_embeddings::{Embedding, EmbeddingError, EmbeddingStore};
use shopchat_ledger::{JobLedger, MetricsLedger, ResponseCache, SettingsStore, TranscriptStore};
use shopchat_pipeline::ContentPipeline;

use crate::AppState;

/// A generation payload that passes schema validation.
pub const SEO_JSON: &str = r#"{
    "features": ["Breathable mesh", "Grippy sole", "Light build"],
    "use_cases": ["Trail running", "Hiking", "Daily wear"],
    "faqs": [
        {"q": "Are they waterproof?", "a": "Water resistant, not waterproof."},
        {"q": "Do they run small?", "a": "True to size."},
        {"q": "What surfaces?", "a": "Dirt, rock and gravel."},
        {"q": "How heavy?", "a": "About 250g per shoe."},
        {"q": "Can I machine wash them?", "a": "Hand wash only."}
    ]
}"#;

struct QueuedCompletions {
    replies: Mutex<VecDeque<String>>,
}

#[async_trait]
impl CompletionProvider for QueuedCompletions {
    fn name(&self) -> &str {
        "queued"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> shopchat_completions::Result<CompletionReply> {
        match self.replies.lock().expect("replies lock").pop_front() {
            Some(text) => Ok(CompletionReply::Text(text)),
            None => Err(CompletionError::ApiRequest(
                "no scripted reply left".to_string(),
            )),
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

struct StubEmbeddings;

#[async_trait]
impl EmbeddingProvider for StubEmbeddings {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        Ok((0..8)
            .map(|i| ((seed.rotate_left(i * 8) & 0xff) as f32) / 255.0)
            .collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Everything a handler test needs: the app state plus concrete handles to
/// the fixtures behind the trait objects.
#[derive(Clone)]
pub struct TestContext {
    pub state: AppState,
    pub catalog: Arc<InMemoryCatalog>,
}

/// Build a test context whose completion provider replays `replies` in
/// order, then fails.
pub fn test_context(replies: Vec<&str>) -> TestContext {
    let completions: Arc<dyn CompletionProvider> = Arc::new(QueuedCompletions {
        replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
    });
    let catalog = Arc::new(InMemoryCatalog::new());
    let catalog_dyn: Arc<dyn CatalogClient> = Arc::clone(&catalog) as Arc<dyn CatalogClient>;

    let settings = Arc::new(SettingsStore::new());
    let cache = Arc::new(ResponseCache::new());
    let embeddings = Arc::new(EmbeddingStore::new(Arc::new(StubEmbeddings)));
    let metrics = Arc::new(MetricsLedger::new());
    let transcripts = Arc::new(TranscriptStore::new());
    let jobs = Arc::new(JobLedger::new());

    let orchestrator = Arc::new(
        ChatOrchestrator::new(
            Arc::clone(&settings),
            Arc::clone(&cache),
            Arc::clone(&embeddings),
            Arc::clone(&completions),
            Arc::clone(&catalog_dyn),
            Arc::clone(&metrics),
            Arc::clone(&transcripts),
        )
        .with_fallback_chooser(fixed_chooser(0)),
    );

    let pipeline = Arc::new(ContentPipeline::new(
        Arc::clone(&catalog_dyn),
        Arc::clone(&completions),
        Arc::clone(&embeddings),
        Arc::clone(&metrics),
        jobs,
    ));

    TestContext {
        state: AppState {
            orchestrator,
            pipeline,
            settings,
            embeddings,
            catalog: catalog_dyn,
            metrics,
        },
        catalog,
    }
}

/// Shorthand: a state whose provider always answers with `reply`.
pub fn test_state(reply: &str) -> AppState {
    test_context(vec![reply, reply, reply, reply]).state
}
