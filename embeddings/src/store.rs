//! Per-shop entity embedding store.
//!
//! One row per (shop, entity). Upserts embed the entity's canonical text
//! exactly once and either write the whole row or nothing: a provider
//! failure leaves the store untouched. Concurrent upserts for the same key
//! converge last-write-wins through the map insert, with no application
//! locking beyond the store's own `RwLock`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;

/// What kind of entity a row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A catalog product.
    Product,

    /// A shop policy (shipping, returns, ...).
    Policy,
}

/// A question/answer pair generated for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// The question.
    pub q: String,

    /// The answer.
    pub a: String,
}

/// A stored embedding row for one entity of one shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityEmbedding {
    /// Owning shop.
    pub shop: String,

    /// Entity id within the shop.
    pub entity_id: String,

    /// Product or policy.
    pub kind: EntityKind,

    /// Entity title.
    pub title: String,

    /// Product description or policy content.
    pub body: Option<String>,

    /// Generated product features.
    pub features: Vec<String>,

    /// Generated product use cases.
    pub use_cases: Vec<String>,

    /// Generated FAQ pairs.
    pub faqs: Vec<FaqEntry>,

    /// Policy type slug, for policy rows.
    pub policy_type: Option<String>,

    /// The embedding vector.
    pub vector: Embedding,

    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

/// Join the non-empty text fields that feed the embedding.
fn canonical_text(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

struct StoredRow {
    row: EntityEmbedding,
    seq: u64,
}

/// In-memory embedding store.
///
/// The storage contract is a unique-key upsert per (shop, entity_id);
/// everything above it assumes exactly that and nothing more, so swapping in
/// a database-backed implementation only has to preserve the key.
pub struct EmbeddingStore {
    provider: Arc<dyn EmbeddingProvider>,
    rows: RwLock<HashMap<(String, String), StoredRow>>,
    seq: AtomicU64,
}

impl EmbeddingStore {
    /// Create a store over the given provider.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            rows: RwLock::new(HashMap::new()),
            seq: AtomicU64::new(0),
        }
    }

    /// The provider used to embed rows (and, by contract, queries).
    pub fn provider(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.provider)
    }

    /// Insert or refresh a product row.
    ///
    /// Embeds the concatenation of title, description, features and use
    /// cases. Fails atomically: a provider error writes nothing.
    pub async fn upsert_product(
        &self,
        shop: &str,
        entity_id: &str,
        title: &str,
        description: Option<&str>,
        features: Vec<String>,
        use_cases: Vec<String>,
        faqs: Vec<FaqEntry>,
    ) -> Result<EntityEmbedding> {
        let text = canonical_text(&[
            title,
            description.unwrap_or(""),
            &features.join(" "),
            &use_cases.join(" "),
        ]);

        let row = EntityEmbedding {
            shop: shop.to_string(),
            entity_id: entity_id.to_string(),
            kind: EntityKind::Product,
            title: title.to_string(),
            body: description.map(str::to_string),
            features,
            use_cases,
            faqs,
            policy_type: None,
            vector: Vec::new(),
            updated_at: Utc::now(),
        };

        self.embed_and_insert(row, &text).await
    }

    /// Insert or refresh a policy row.
    pub async fn upsert_policy(
        &self,
        shop: &str,
        policy_id: &str,
        title: &str,
        content: &str,
        policy_type: &str,
    ) -> Result<EntityEmbedding> {
        let text = canonical_text(&[title, content]);

        let row = EntityEmbedding {
            shop: shop.to_string(),
            entity_id: policy_id.to_string(),
            kind: EntityKind::Policy,
            title: title.to_string(),
            body: Some(content.to_string()),
            features: Vec::new(),
            use_cases: Vec::new(),
            faqs: Vec::new(),
            policy_type: Some(policy_type.to_string()),
            vector: Vec::new(),
            updated_at: Utc::now(),
        };

        self.embed_and_insert(row, &text).await
    }

    async fn embed_and_insert(
        &self,
        mut row: EntityEmbedding,
        text: &str,
    ) -> Result<EntityEmbedding> {
        // Embed before taking the write lock; a failure here must leave the
        // store untouched.
        row.vector = self.provider.embed(text).await?;
        row.updated_at = Utc::now();

        let mut rows = self.rows.write().await;

        // Every row of a shop must share one embedding dimension.
        if let Some(existing) = rows.values().find(|r| r.row.shop == row.shop) {
            if existing.row.vector.len() != row.vector.len() {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: existing.row.vector.len(),
                    actual: row.vector.len(),
                });
            }
        }

        let key = (row.shop.clone(), row.entity_id.clone());
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        rows.insert(
            key,
            StoredRow {
                row: row.clone(),
                seq,
            },
        );
        debug!("Upserted embedding for {}/{}", row.shop, row.entity_id);

        Ok(row)
    }

    /// Get one entity's row.
    pub async fn get(&self, shop: &str, entity_id: &str) -> Option<EntityEmbedding> {
        let rows = self.rows.read().await;
        rows.get(&(shop.to_string(), entity_id.to_string()))
            .map(|r| r.row.clone())
    }

    /// List a shop's rows, most recently written first.
    pub async fn list_all(&self, shop: &str) -> Vec<EntityEmbedding> {
        let rows = self.rows.read().await;
        let mut shop_rows: Vec<&StoredRow> =
            rows.values().filter(|r| r.row.shop == shop).collect();
        shop_rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        shop_rows.into_iter().map(|r| r.row.clone()).collect()
    }

    /// Delete one entity's row. Deleting a missing row is a no-op.
    pub async fn delete(&self, shop: &str, entity_id: &str) {
        let mut rows = self.rows.write().await;
        if rows
            .remove(&(shop.to_string(), entity_id.to_string()))
            .is_some()
        {
            debug!("Deleted embedding for {shop}/{entity_id}");
        }
    }

    /// Number of rows stored for a shop.
    pub async fn len(&self, shop: &str) -> usize {
        let rows = self.rows.read().await;
        rows.values().filter(|r| r.row.shop == shop).count()
    }

    /// Whether the shop has no rows.
    pub async fn is_empty(&self, shop: &str) -> bool {
        self.len(shop).await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubEmbeddings;
    use pretty_assertions::assert_eq;

    fn store_with_stub() -> EmbeddingStore {
        EmbeddingStore::new(Arc::new(StubEmbeddings::new(4)))
    }

    #[tokio::test]
    async fn test_upsert_converges_to_one_row() {
        let store = store_with_stub();

        store
            .upsert_product("shop-a", "p1", "First title", None, vec![], vec![], vec![])
            .await
            .unwrap();
        store
            .upsert_product(
                "shop-a",
                "p1",
                "Second title",
                Some("new copy"),
                vec![],
                vec![],
                vec![],
            )
            .await
            .unwrap();

        assert_eq!(store.len("shop-a").await, 1);
        let row = store.get("shop-a", "p1").await.unwrap();
        assert_eq!(row.title, "Second title");

        // The vector reflects the last-written text.
        let expected = StubEmbeddings::new(4)
            .vector_for("Second title new copy")
            .await;
        assert_eq!(row.vector, expected);
    }

    #[tokio::test]
    async fn test_provider_failure_writes_nothing() {
        let provider = Arc::new(StubEmbeddings::new(4).failing());
        let store = EmbeddingStore::new(provider);

        let result = store
            .upsert_product("shop-a", "p1", "Widget", None, vec![], vec![], vec![])
            .await;

        assert!(result.is_err());
        assert!(store.get("shop-a", "p1").await.is_none());
        assert!(store.is_empty("shop-a").await);
    }

    #[tokio::test]
    async fn test_rows_are_scoped_by_shop() {
        let store = store_with_stub();

        store
            .upsert_product("shop-a", "p1", "A", None, vec![], vec![], vec![])
            .await
            .unwrap();
        store
            .upsert_product("shop-b", "p1", "B", None, vec![], vec![], vec![])
            .await
            .unwrap();

        assert_eq!(store.len("shop-a").await, 1);
        assert_eq!(store.len("shop-b").await, 1);
        assert_eq!(store.get("shop-a", "p1").await.unwrap().title, "A");
        assert_eq!(store.get("shop-b", "p1").await.unwrap().title, "B");
    }

    #[tokio::test]
    async fn test_list_all_most_recent_first() {
        let store = store_with_stub();

        for id in ["p1", "p2", "p3"] {
            store
                .upsert_product("shop-a", id, id, None, vec![], vec![], vec![])
                .await
                .unwrap();
        }
        // Refreshing p1 moves it to the front.
        store
            .upsert_product("shop-a", "p1", "p1", None, vec![], vec![], vec![])
            .await
            .unwrap();

        let ids: Vec<String> = store
            .list_all("shop-a")
            .await
            .into_iter()
            .map(|r| r.entity_id)
            .collect();
        assert_eq!(ids, vec!["p1", "p3", "p2"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store_with_stub();

        store
            .upsert_product("shop-a", "p1", "Widget", None, vec![], vec![], vec![])
            .await
            .unwrap();
        store.delete("shop-a", "p1").await;

        assert!(store.get("shop-a", "p1").await.is_none());

        // Deleting again is a no-op.
        store.delete("shop-a", "p1").await;
    }

    #[tokio::test]
    async fn test_policy_rows() {
        let store = store_with_stub();

        let row = store
            .upsert_policy("shop-a", "pol1", "Returns", "30 days, no questions", "returns")
            .await
            .unwrap();

        assert_eq!(row.kind, EntityKind::Policy);
        assert_eq!(row.policy_type.as_deref(), Some("returns"));
    }
}
