//! Job queue for enqueuing and dequeuing background jobs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cabinet_core::error::AppError;
use cabinet_core::result::AppResult;
use cabinet_core::traits::JobPublisher;
use cabinet_database::repositories::JobRepository;
use cabinet_entity::job::model::{CreateJob, Job};

/// Attempts allowed per job. Thumbnail jobs are not retried.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 1;

/// The side of the queue a worker consumes: claim jobs and record how they ended.
#[async_trait]
pub trait WorkQueue: Send + Sync + std::fmt::Debug {
    /// Identifier stamped on claimed jobs.
    fn worker_id(&self) -> &str;

    /// Claim the next pending job, if any.
    async fn dequeue(&self) -> AppResult<Option<Job>>;

    /// Mark a job as completed.
    async fn complete(&self, job_id: Uuid) -> AppResult<()>;

    /// Mark a job as failed for good.
    async fn fail(&self, job_id: Uuid, error: &str) -> AppResult<()>;

    /// Return a job to pending after a transient failure.
    async fn retry(&self, job_id: Uuid, error: &str) -> AppResult<()>;

    /// Requeue jobs that have been running for longer than `stalled_after`.
    async fn requeue_stalled(&self, stalled_after: Duration) -> AppResult<u64>;
}

/// Job queue bound to one named queue.
#[derive(Debug, Clone)]
pub struct JobQueue {
    /// Job repository for database persistence
    repo: Arc<JobRepository>,
    /// Queue name
    queue: String,
    /// Worker identifier for claiming jobs
    worker_id: String,
}

impl JobQueue {
    /// Create a new job queue
    pub fn new(repo: Arc<JobRepository>, queue: impl Into<String>, worker_id: impl Into<String>) -> Self {
        Self {
            repo,
            queue: queue.into(),
            worker_id: worker_id.into(),
        }
    }

    /// Enqueue a new job
    pub async fn enqueue(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Job> {
        let job = self
            .repo
            .create(&CreateJob {
                job_type: job_type.to_string(),
                queue: self.queue.clone(),
                payload,
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            })
            .await?;

        tracing::debug!(job_id = %job.id, job_type = %job.job_type, queue = %job.queue, "Enqueued job");
        Ok(job)
    }
}

#[async_trait]
impl WorkQueue for JobQueue {
    fn worker_id(&self) -> &str {
        &self.worker_id
    }

    async fn dequeue(&self) -> AppResult<Option<Job>> {
        let job = self.repo.dequeue(&self.queue, &self.worker_id).await?;
        if let Some(job) = &job {
            tracing::debug!(job_id = %job.id, job_type = %job.job_type, "Dequeued job");
        }
        Ok(job)
    }

    async fn complete(&self, job_id: Uuid) -> AppResult<()> {
        self.repo.complete(job_id).await
    }

    async fn fail(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        self.repo.fail(job_id, error).await
    }

    async fn retry(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        self.repo.retry(job_id, error).await
    }

    async fn requeue_stalled(&self, stalled_after: Duration) -> AppResult<u64> {
        let cutoff = stall_cutoff(Utc::now(), stalled_after)?;
        self.repo.requeue_stalled(cutoff).await
    }
}

#[async_trait]
impl JobPublisher for JobQueue {
    async fn publish(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Uuid> {
        self.enqueue(job_type, payload).await.map(|job| job.id)
    }
}

/// Jobs started before the returned instant count as stalled.
fn stall_cutoff(now: DateTime<Utc>, stalled_after: Duration) -> AppResult<DateTime<Utc>> {
    let age = chrono::Duration::from_std(stalled_after)
        .map_err(|e| AppError::configuration(format!("Invalid stall timeout: {e}")))?;
    now.checked_sub_signed(age)
        .ok_or_else(|| AppError::configuration("Stall timeout reaches before the epoch range"))
}
