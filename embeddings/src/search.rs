//! Similarity search over a shop's embedding store.

use std::sync::Arc;

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::error::Result;
use crate::provider::EmbeddingProvider;
use crate::store::{EmbeddingStore, EntityEmbedding, EntityKind};

/// A scored search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The matched entity row.
    pub entity: EntityEmbedding,

    /// Cosine similarity against the query.
    pub score: f32,
}

/// Cosine-similarity search engine.
///
/// Embeds the query with the same provider that built the index, scores
/// every stored vector for the shop, and returns the top k. Full scan,
/// O(n·d) per query.
pub struct SimilaritySearch {
    store: Arc<EmbeddingStore>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl SimilaritySearch {
    /// Create a search engine over a store, reusing the store's provider.
    pub fn new(store: Arc<EmbeddingStore>) -> Self {
        let provider = store.provider();
        Self { store, provider }
    }

    /// Search all of a shop's entities.
    pub async fn search(&self, shop: &str, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.search_filtered(shop, query, k, None).await
    }

    /// Search only rows of one kind (products or policies).
    pub async fn search_kind(
        &self,
        shop: &str,
        query: &str,
        k: usize,
        kind: EntityKind,
    ) -> Result<Vec<SearchHit>> {
        self.search_filtered(shop, query, k, Some(kind)).await
    }

    async fn search_filtered(
        &self,
        shop: &str,
        query: &str,
        k: usize,
        kind: Option<EntityKind>,
    ) -> Result<Vec<SearchHit>> {
        let query_vector = self.provider.embed(query).await?;

        let rows = self.store.list_all(shop).await;
        let mut hits = Vec::with_capacity(rows.len());
        for entity in rows {
            if let Some(kind) = kind {
                if entity.kind != kind {
                    continue;
                }
            }

            let score = crate::similarity::cosine_similarity(&query_vector, &entity.vector)?;
            hits.push(SearchHit { entity, score });
        }

        // Stable sort: equal scores keep the store's retrieval order.
        hits.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
        hits.truncate(k);

        debug!("Search for {shop:?} returned {} hits", hits.len());

        Ok(hits)
    }
}
