//! Append-only chat transcripts.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// One message in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// Author role ("system", "user", "assistant").
    pub role: String,

    /// Message text.
    pub content: String,

    /// When the message was recorded.
    pub timestamp: DateTime<Utc>,
}

impl TranscriptMessage {
    /// Create a message timestamped now.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A per-session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Owning shop.
    pub shop: String,

    /// Widget session id.
    pub session_id: String,

    /// Messages in order of arrival.
    pub messages: Vec<TranscriptMessage>,

    /// Free-form turn metadata (product id, context, actions).
    pub metadata: serde_json::Value,

    /// When the transcript last grew.
    pub updated_at: DateTime<Utc>,
}

/// Store of per-session transcripts. Append-only: messages are never
/// rewritten, only added, until retention pruning removes whole sessions.
pub struct TranscriptStore {
    transcripts: RwLock<HashMap<(String, String), Transcript>>,
}

impl TranscriptStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            transcripts: RwLock::new(HashMap::new()),
        }
    }

    /// Append a turn's messages to a session, creating it on first write.
    pub async fn append(
        &self,
        shop: &str,
        session_id: &str,
        messages: Vec<TranscriptMessage>,
        metadata: Option<serde_json::Value>,
    ) {
        let mut transcripts = self.transcripts.write().await;
        let key = (shop.to_string(), session_id.to_string());

        let transcript = transcripts.entry(key).or_insert_with(|| Transcript {
            shop: shop.to_string(),
            session_id: session_id.to_string(),
            messages: Vec::new(),
            metadata: serde_json::Value::Null,
            updated_at: Utc::now(),
        });

        transcript.messages.extend(messages);
        if let Some(metadata) = metadata {
            transcript.metadata = metadata;
        }
        transcript.updated_at = Utc::now();
    }

    /// Get one session's transcript.
    pub async fn get(&self, shop: &str, session_id: &str) -> Option<Transcript> {
        let transcripts = self.transcripts.read().await;
        transcripts
            .get(&(shop.to_string(), session_id.to_string()))
            .cloned()
    }

    /// Remove a shop's transcripts older than the retention window.
    /// Returns how many sessions were dropped.
    pub async fn prune(&self, shop: &str, retention_days: u32) -> usize {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
        let mut transcripts = self.transcripts.write().await;
        let before = transcripts.len();
        transcripts.retain(|(s, _), t| s != shop || t.updated_at >= cutoff);
        let removed = before - transcripts.len();
        if removed > 0 {
            debug!("Pruned {removed} transcripts for {shop}");
        }
        removed
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_append_accumulates_messages() {
        let store = TranscriptStore::new();

        store
            .append(
                "shop-a",
                "sess-1",
                vec![
                    TranscriptMessage::new("user", "hi"),
                    TranscriptMessage::new("assistant", "hello"),
                ],
                None,
            )
            .await;
        store
            .append(
                "shop-a",
                "sess-1",
                vec![TranscriptMessage::new("user", "thanks")],
                Some(serde_json::json!({"productId": "p1"})),
            )
            .await;

        let transcript = store.get("shop-a", "sess-1").await.unwrap();
        assert_eq!(transcript.messages.len(), 3);
        assert_eq!(transcript.messages[2].content, "thanks");
        assert_eq!(transcript.metadata["productId"], "p1");
    }

    #[tokio::test]
    async fn test_sessions_are_separate() {
        let store = TranscriptStore::new();

        store
            .append(
                "shop-a",
                "sess-1",
                vec![TranscriptMessage::new("user", "hi")],
                None,
            )
            .await;
        store
            .append(
                "shop-a",
                "sess-2",
                vec![TranscriptMessage::new("user", "yo")],
                None,
            )
            .await;

        assert_eq!(store.get("shop-a", "sess-1").await.unwrap().messages.len(), 1);
        assert_eq!(store.get("shop-a", "sess-2").await.unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_prune_respects_retention_window() {
        let store = TranscriptStore::new();
        store
            .append(
                "shop-a",
                "old",
                vec![TranscriptMessage::new("user", "hi")],
                None,
            )
            .await;

        // Backdate the session past the retention window.
        {
            let mut transcripts = store.transcripts.write().await;
            if let Some(t) = transcripts.get_mut(&("shop-a".to_string(), "old".to_string())) {
                t.updated_at = Utc::now() - Duration::days(31);
            }
        }
        store
            .append(
                "shop-a",
                "fresh",
                vec![TranscriptMessage::new("user", "hi")],
                None,
            )
            .await;

        let removed = store.prune("shop-a", 30).await;
        assert_eq!(removed, 1);
        assert!(store.get("shop-a", "old").await.is_none());
        assert!(store.get("shop-a", "fresh").await.is_some());
    }
}
