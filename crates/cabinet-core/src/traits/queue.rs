//! Job publishing trait used by services to hand work to the worker.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Producer side of the background job queue.
#[async_trait]
pub trait JobPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Enqueue a job of `job_type` carrying `payload`. Returns the job ID.
    async fn publish(&self, job_type: &str, payload: serde_json::Value) -> AppResult<Uuid>;
}
