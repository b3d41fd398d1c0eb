//! Job entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job claimed by a worker.
///
/// Bookkeeping columns (status, timestamps, worker id, last error) live in
/// the `jobs` table and are only touched by the queue's SQL.
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: Uuid,
    /// Job type identifier (e.g., `"thumbnail_generation"`).
    pub job_type: String,
    pub queue: String,
    /// Job-specific payload (JSON).
    pub payload: serde_json::Value,
    /// Attempts made so far, including the current one.
    pub attempts: i32,
    pub max_attempts: i32,
}

impl Job {
    /// Check if a failed attempt may be retried.
    pub fn has_attempts_left(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

/// Data required to create a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Job type identifier.
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    /// Job-specific payload.
    pub payload: serde_json::Value,
    /// Maximum attempts.
    pub max_attempts: i32,
}
