//! Scripted collaborators for pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use shopchat_completions::{
    CompletionError, CompletionProvider, CompletionReply, CompletionRequest,
};
use shopchat_embeddings::provider::EmbeddingProvider;
use shopchat_embeddings::{Embedding, EmbeddingError};

/// One scripted provider step.
pub enum Step {
    /// Reply with this text.
    Text(String),

    /// Fail with a transport-style error.
    Fail,
}

impl Step {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A completion provider that replays a scripted step sequence; once the
/// script runs out every further call fails.
pub struct ScriptedCompletions {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedCompletions {
    pub fn sequence(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::sequence(vec![Step::text(text)])
    }

    pub fn failing() -> Self {
        Self::sequence(Vec::new())
    }

    /// How many completion calls were made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletions {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> shopchat_completions::Result<CompletionReply> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let next = self.steps.lock().expect("steps lock").pop_front();
        match next {
            Some(Step::Text(text)) => Ok(CompletionReply::Text(text)),
            Some(Step::Fail) | None => Err(CompletionError::ApiRequest(
                "scripted transport failure".to_string(),
            )),
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// A deterministic embedding provider (hash of the text).
pub struct StubEmbeddings {
    dimension: usize,
}

impl StubEmbeddings {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

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

        Ok((0..self.dimension)
            .map(|i| ((seed.rotate_left(i as u32 * 8) & 0xff) as f32) / 255.0)
            .collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}
