//! Deterministic embedding provider for tests.

use async_trait::async_trait;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;

/// A provider that derives a stable pseudo-vector from the input text.
///
/// Identical texts embed identically, so similarity ordering is
/// reproducible without any network access.
pub struct StubEmbeddings {
    dimension: usize,
    fail: bool,
}

impl StubEmbeddings {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
        }
    }

    /// Make every embed call fail with a provider error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// The vector `embed` would return for this text.
    pub async fn vector_for(&self, text: &str) -> Embedding {
        self.embed(text).await.unwrap()
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

    async fn embed(&self, text: &str) -> Result<Embedding> {
        if self.fail {
            return Err(EmbeddingError::ApiRequest("stub failure".to_string()));
        }

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        Ok((0..self.dimension)
            .map(|i| {
                let byte = (seed.rotate_left(i as u32 * 8) & 0xff) as f32;
                byte / 255.0
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        true
    }
}
