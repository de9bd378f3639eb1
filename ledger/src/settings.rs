//! Per-shop assistant settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Settings controlling one shop's assistant.
///
/// A singleton per shop, created with defaults on first read and mutated by
/// the merchant admin surface (out of scope here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopSettings {
    /// Owning shop.
    pub shop: String,

    /// Whether the chat widget is enabled at all.
    pub chat_enabled: bool,

    /// Plain Q&A mode: when true, no functions are offered to the model,
    /// read-only ones included, so no action block can ever be produced.
    pub restrict_to_qa: bool,

    /// Whether the `add_to_cart` function is offered.
    pub allow_add_to_cart: bool,

    /// Brand tone preset fed into the system prompt.
    pub tone_preset: String,

    /// Words the assistant should work into replies.
    pub brand_words: Vec<String>,

    /// Words the assistant must avoid.
    pub blocklist: Vec<String>,

    /// Reply token budget.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Whether turns are written to the transcript store.
    pub transcript_retention: bool,

    /// How long transcripts are kept, in days.
    pub retention_days: u32,
}

impl ShopSettings {
    /// Default settings for a shop that has never been configured.
    pub fn defaults(shop: impl Into<String>) -> Self {
        Self {
            shop: shop.into(),
            chat_enabled: true,
            restrict_to_qa: false,
            allow_add_to_cart: false,
            tone_preset: "professional".to_string(),
            brand_words: Vec::new(),
            blocklist: Vec::new(),
            max_tokens: 1000,
            temperature: 0.7,
            transcript_retention: false,
            retention_days: 30,
        }
    }
}

/// Store of per-shop settings.
pub struct SettingsStore {
    settings: RwLock<HashMap<String, ShopSettings>>,
}

impl SettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(HashMap::new()),
        }
    }

    /// Get a shop's settings, creating defaults on first read.
    pub async fn get_or_create(&self, shop: &str) -> ShopSettings {
        {
            let settings = self.settings.read().await;
            if let Some(existing) = settings.get(shop) {
                return existing.clone();
            }
        }

        let mut settings = self.settings.write().await;
        settings
            .entry(shop.to_string())
            .or_insert_with(|| ShopSettings::defaults(shop))
            .clone()
    }

    /// Replace a shop's settings.
    pub async fn upsert(&self, new_settings: ShopSettings) {
        let mut settings = self.settings.write().await;
        settings.insert(new_settings.shop.clone(), new_settings);
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
