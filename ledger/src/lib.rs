//! # Ledger
//!
//! Per-shop bookkeeping for the shopchat assistant: the TTL response cache,
//! shop settings, chat transcripts, daily metrics, and the write-only job
//! queue.
//!
//! Every store here is keyed by shop; no data crosses shop boundaries. The
//! stores are in-memory maps behind `RwLock`s — the contract each exposes
//! (unique keys, upserts, passive expiry) is what a database-backed
//! implementation must preserve.

pub mod cache;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod settings;
pub mod transcript;

pub use cache::{CachedAnswer, ResponseCache, DEFAULT_CACHE_TTL_HOURS};
pub use error::{LedgerError, Result};
pub use jobs::{JobLedger, JobRecord, JobStatus};
pub use metrics::{MetricSample, MetricsLedger};
pub use settings::{SettingsStore, ShopSettings};
pub use transcript::{Transcript, TranscriptMessage, TranscriptStore};
