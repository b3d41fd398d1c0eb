//! Background job processing for Cabinet.
//!
//! This crate provides:
//! - A Postgres-backed job queue that also serves as the publisher for
//!   upload-time work
//! - A worker runner that polls for and executes queued jobs
//! - A job executor that dispatches jobs to the correct handler
//! - The thumbnail generation handler

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use queue::{JobQueue, WorkQueue};
pub use runner::WorkerRunner;
