//! Write-only job queue.
//!
//! Generation paths enqueue work here, but nothing in this core drains it.
//! The status machine (`pending → running → completed | failed`) and FIFO
//! ordering are enforced as the contract a future worker will rely on.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{LedgerError, Result};

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting to be picked up.
    Pending,

    /// Claimed by a worker.
    Running,

    /// Finished successfully.
    Completed,

    /// Finished with an error.
    Failed,
}

/// A queued unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job id.
    pub id: String,

    /// Owning shop.
    pub shop: String,

    /// Kind of work (e.g. `seo_generation`).
    pub job_type: String,

    /// Lifecycle status.
    pub status: JobStatus,

    /// Input payload.
    pub data: Option<serde_json::Value>,

    /// Output payload, set on completion.
    pub result: Option<serde_json::Value>,

    /// Error message, set on failure.
    pub error: Option<String>,

    /// When the job was enqueued.
    pub created_at: DateTime<Utc>,

    /// When a worker claimed the job.
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
}

struct StoredJob {
    record: JobRecord,
    seq: u64,
}

/// In-memory job queue.
pub struct JobLedger {
    jobs: RwLock<HashMap<String, StoredJob>>,
    seq: std::sync::atomic::AtomicU64,
}

impl JobLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            seq: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Enqueue a new pending job.
    pub async fn create(
        &self,
        shop: &str,
        job_type: &str,
        data: Option<serde_json::Value>,
    ) -> JobRecord {
        let record = JobRecord {
            id: Uuid::new_v4().to_string(),
            shop: shop.to_string(),
            job_type: job_type.to_string(),
            status: JobStatus::Pending,
            data,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        };

        let seq = self.seq.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let mut jobs = self.jobs.write().await;
        jobs.insert(
            record.id.clone(),
            StoredJob {
                record: record.clone(),
                seq,
            },
        );
        debug!("Enqueued {} job {} for {shop}", record.job_type, record.id);

        record
    }

    /// Get one job.
    pub async fn get(&self, id: &str) -> Option<JobRecord> {
        let jobs = self.jobs.read().await;
        jobs.get(id).map(|j| j.record.clone())
    }

    /// Claim a pending job (`pending → running`).
    pub async fn start(&self, id: &str) -> Result<JobRecord> {
        self.transition(id, JobStatus::Running, None, None).await
    }

    /// Complete a running job (`running → completed`).
    pub async fn complete(&self, id: &str, result: Option<serde_json::Value>) -> Result<JobRecord> {
        self.transition(id, JobStatus::Completed, result, None).await
    }

    /// Fail a running job (`running → failed`).
    pub async fn fail(&self, id: &str, error: impl Into<String>) -> Result<JobRecord> {
        self.transition(id, JobStatus::Failed, None, Some(error.into()))
            .await
    }

    async fn transition(
        &self,
        id: &str,
        to: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Result<JobRecord> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| LedgerError::JobNotFound(id.to_string()))?;

        let from = job.record.status;
        let allowed = matches!(
            (from, to),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        );
        if !allowed {
            return Err(LedgerError::InvalidTransition { from, to });
        }

        job.record.status = to;
        match to {
            JobStatus::Running => job.record.started_at = Some(Utc::now()),
            JobStatus::Completed | JobStatus::Failed => {
                job.record.completed_at = Some(Utc::now());
                job.record.result = result;
                job.record.error = error;
            }
            JobStatus::Pending => {}
        }

        Ok(job.record.clone())
    }

    /// All of a shop's jobs, oldest first.
    pub async fn list(&self, shop: &str) -> Vec<JobRecord> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<&StoredJob> = jobs.values().filter(|j| j.record.shop == shop).collect();
        all.sort_by_key(|j| j.seq);
        all.into_iter().map(|j| j.record.clone()).collect()
    }

    /// A shop's pending jobs, FIFO by creation.
    pub async fn pending_jobs(&self, shop: &str) -> Vec<JobRecord> {
        let jobs = self.jobs.read().await;
        let mut pending: Vec<&StoredJob> = jobs
            .values()
            .filter(|j| j.record.shop == shop && j.record.status == JobStatus::Pending)
            .collect();
        pending.sort_by_key(|j| j.seq);
        pending.into_iter().map(|j| j.record.clone()).collect()
    }
}

impl Default for JobLedger {
    fn default() -> Self {
        Self::new()
    }
}
