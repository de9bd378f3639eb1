//! Daily per-shop metrics.
//!
//! One sample per (shop, day, metric). Recording a metric twice on the same
//! day accumulates its value into that day's sample; the original system
//! overwrote instead, which made every counter read as its last increment —
//! see DESIGN.md for the decision.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One day's value for one metric of one shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    /// Owning shop.
    pub shop: String,

    /// The day, UTC.
    pub date: NaiveDate,

    /// Metric name (e.g. `chat_messages`, `feed_hits`).
    pub metric: String,

    /// Accumulated value for the day.
    pub value: f64,

    /// Metadata from the most recent observation.
    pub metadata: Option<serde_json::Value>,
}

/// Store of daily metric samples.
pub struct MetricsLedger {
    samples: RwLock<HashMap<(String, NaiveDate, String), MetricSample>>,
}

impl MetricsLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            samples: RwLock::new(HashMap::new()),
        }
    }

    /// Record an observation for today.
    pub async fn record(
        &self,
        shop: &str,
        metric: &str,
        value: f64,
        metadata: Option<serde_json::Value>,
    ) {
        self.record_on(Utc::now().date_naive(), shop, metric, value, metadata)
            .await;
    }

    async fn record_on(
        &self,
        date: NaiveDate,
        shop: &str,
        metric: &str,
        value: f64,
        metadata: Option<serde_json::Value>,
    ) {
        let mut samples = self.samples.write().await;
        let key = (shop.to_string(), date, metric.to_string());

        match samples.get_mut(&key) {
            Some(sample) => {
                sample.value += value;
                if metadata.is_some() {
                    sample.metadata = metadata;
                }
            }
            None => {
                samples.insert(
                    key,
                    MetricSample {
                        shop: shop.to_string(),
                        date,
                        metric: metric.to_string(),
                        value,
                        metadata,
                    },
                );
            }
        }
    }

    /// Samples for a shop within an inclusive date range, oldest first.
    pub async fn samples(&self, shop: &str, from: NaiveDate, to: NaiveDate) -> Vec<MetricSample> {
        let samples = self.samples.read().await;
        let mut result: Vec<MetricSample> = samples
            .values()
            .filter(|s| s.shop == shop && s.date >= from && s.date <= to)
            .cloned()
            .collect();
        result.sort_by(|a, b| (a.date, &a.metric).cmp(&(b.date, &b.metric)));
        result
    }

    /// Today's value of one metric, 0 when never recorded.
    pub async fn today(&self, shop: &str, metric: &str) -> f64 {
        let date = Utc::now().date_naive();
        let samples = self.samples.read().await;
        samples
            .get(&(shop.to_string(), date, metric.to_string()))
            .map(|s| s.value)
            .unwrap_or(0.0)
    }
}

impl Default for MetricsLedger {
    fn default() -> Self {
        Self::new()
    }
}
