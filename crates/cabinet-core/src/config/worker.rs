//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Thumbnail worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether `serve` also runs a worker in-process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Queue the worker polls.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Number of concurrent job processing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between job queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Running jobs older than this are handed back to the queue.
    #[serde(default = "default_stalled_after")]
    pub stalled_after_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            queue: default_queue(),
            concurrency: default_concurrency(),
            poll_interval_seconds: default_poll_interval(),
            stalled_after_seconds: default_stalled_after(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_queue() -> String {
    "fileQueue".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_poll_interval() -> u64 {
    2
}

fn default_stalled_after() -> u64 {
    300
}
