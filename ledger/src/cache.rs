//! TTL response cache.
//!
//! Keyed by shop and a normalized query (case-folded, trimmed, plus a
//! context discriminator). Expiry is passive: an expired entry is reported
//! as a miss and overwritten by the next `set`; nothing sweeps the map
//! unless [`ResponseCache::sweep_expired`] is called by an external job.
//!
//! There is deliberately no invalidation on catalog change — a cached
//! answer can go stale relative to updated product data until its TTL
//! elapses. That trade-off is part of the contract.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use shopchat_catalog::AssistantAction;

/// Default time-to-live for cached answers, in hours.
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

/// A previously computed answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnswer {
    /// The answer text.
    pub answer: String,

    /// The action block, if the turn produced one.
    pub actions: Option<AssistantAction>,
}

struct CacheRow {
    answer: CachedAnswer,
    expires_at: DateTime<Utc>,
}

/// Per-shop TTL cache of computed answers.
pub struct ResponseCache {
    entries: RwLock<HashMap<(String, String), CacheRow>>,
}

impl ResponseCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Build the normalized cache key for a query in a context.
    ///
    /// The context discriminator is the product id when the widget is on a
    /// product page, `general` otherwise, so the same question grounded on
    /// different products caches separately.
    pub fn normalized_key(query: &str, product_id: Option<&str>) -> String {
        format!(
            "{}_{}",
            query.trim().to_lowercase(),
            product_id.unwrap_or("general")
        )
    }

    /// Look up an unexpired answer.
    pub async fn get(
        &self,
        shop: &str,
        query: &str,
        product_id: Option<&str>,
    ) -> Option<CachedAnswer> {
        let key = Self::normalized_key(query, product_id);
        let entries = self.entries.read().await;
        let row = entries.get(&(shop.to_string(), key))?;

        if Utc::now() > row.expires_at {
            return None;
        }

        Some(row.answer.clone())
    }

    /// Store an answer with the given TTL (default 24 hours).
    pub async fn set(
        &self,
        shop: &str,
        query: &str,
        product_id: Option<&str>,
        answer: CachedAnswer,
        ttl: Option<Duration>,
    ) {
        let key = Self::normalized_key(query, product_id);
        let expires_at =
            Utc::now() + ttl.unwrap_or_else(|| Duration::hours(DEFAULT_CACHE_TTL_HOURS));

        let mut entries = self.entries.write().await;
        entries.insert((shop.to_string(), key), CacheRow { answer, expires_at });
    }

    /// Drop every expired entry. Returns how many were removed.
    ///
    /// The core never calls this; it exists for an external sweep job.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, row| row.expires_at >= now);
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Swept {removed} expired cache entries");
        }
        removed
    }

    /// Number of entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
