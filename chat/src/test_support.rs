//! Scripted collaborators for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use shopchat_completions::{
    CompletionError, CompletionProvider, CompletionReply, CompletionRequest, FunctionCall,
};
use shopchat_embeddings::provider::EmbeddingProvider;
use shopchat_embeddings::{Embedding, EmbeddingError};

enum ScriptedReply {
    Text(String),
    FunctionCall { name: String, arguments: String },
}

/// A completion provider that replays a scripted sequence of replies and
/// records every request it receives.
pub struct ScriptedCompletions {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<CompletionRequest>>,
    available: bool,
}

impl ScriptedCompletions {
    fn with_replies(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            available: true,
        }
    }

    /// Always reply with this text.
    pub fn text(text: &str) -> Self {
        Self::with_replies(vec![ScriptedReply::Text(text.to_string())])
    }

    /// Reply once with a function-call intent.
    pub fn function_call(name: &str, arguments: &str) -> Self {
        Self::with_replies(vec![ScriptedReply::FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        }])
    }

    /// Reply with a function call, then with text (for two-step flows).
    pub fn function_call_then_text(name: &str, arguments: &str, text: &str) -> Self {
        Self::with_replies(vec![
            ScriptedReply::FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
            ScriptedReply::Text(text.to_string()),
        ])
    }

    /// Fail every call with a transport-style error.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            available: true,
        }
    }

    /// Report not-configured without ever being called.
    pub fn unavailable() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            available: false,
        }
    }

    /// Requests seen so far.
    pub fn seen_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletions {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> shopchat_completions::Result<CompletionReply> {
        self.requests.lock().expect("requests lock").push(request);

        let next = self.replies.lock().expect("replies lock").pop_front();
        match next {
            Some(ScriptedReply::Text(text)) => Ok(CompletionReply::Text(text)),
            Some(ScriptedReply::FunctionCall { name, arguments }) => {
                Ok(CompletionReply::FunctionCall(FunctionCall {
                    name,
                    arguments,
                }))
            }
            None => Err(CompletionError::ApiRequest(
                "scripted transport failure".to_string(),
            )),
        }
    }

    fn is_available(&self) -> bool {
        self.available
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
