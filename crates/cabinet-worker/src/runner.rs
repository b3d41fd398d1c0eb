//! Worker runner: main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Semaphore, watch};
use tokio::time;

use cabinet_core::config::WorkerConfig;
use cabinet_entity::job::model::Job;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::WorkQueue;

/// How long shutdown waits for in-flight jobs.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Main worker runner that polls the queue and executes jobs
#[derive(Debug)]
pub struct WorkerRunner {
    /// Job queue for polling
    queue: Arc<dyn WorkQueue>,
    /// Job executor for dispatching
    executor: Arc<JobExecutor>,
    /// Worker configuration
    config: WorkerConfig,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(queue: Arc<dyn WorkQueue>, executor: Arc<JobExecutor>, config: WorkerConfig) -> Self {
        Self {
            queue,
            executor,
            config,
        }
    }

    /// Start the worker runner; runs until the cancel signal is received,
    /// then waits for in-flight jobs.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let worker_id = self.queue.worker_id().to_string();
        let concurrency = self.config.concurrency.max(1);
        tracing::info!(
            worker_id = %worker_id,
            concurrency,
            poll_interval_seconds = self.config.poll_interval_seconds,
            queue = %self.config.queue,
            "Worker started"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds.max(1));
        let stalled_after = Duration::from_secs(self.config.stalled_after_seconds);

        let mut last_sweep = time::Instant::now();

        loop {
            if last_sweep.elapsed() >= stalled_after {
                self.requeue_stalled(stalled_after).await;
                last_sweep = time::Instant::now();
            }

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!(worker_id = %worker_id, "Worker received shutdown signal");
                        break;
                    }
                }
                claimed = self.poll_and_execute(&semaphore) => {
                    if claimed {
                        continue;
                    }
                    tokio::select! {
                        changed = cancel.changed() => {
                            if changed.is_err() || *cancel.borrow() {
                                tracing::info!(worker_id = %worker_id, "Worker shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!(worker_id = %worker_id, "Waiting for in-flight jobs to complete");

        let permits = u32::try_from(concurrency).unwrap_or(u32::MAX);
        if time::timeout(DRAIN_TIMEOUT, semaphore.acquire_many(permits))
            .await
            .is_err()
        {
            tracing::warn!(worker_id = %worker_id, "Timed out waiting for in-flight jobs");
        }

        tracing::info!(worker_id = %worker_id, "Worker shut down complete");
    }

    async fn requeue_stalled(&self, stalled_after: Duration) {
        match self.queue.requeue_stalled(stalled_after).await {
            Ok(0) => {}
            Ok(count) => tracing::warn!(count, "Requeued stalled jobs"),
            Err(e) => tracing::error!(error = %e, "Failed to requeue stalled jobs"),
        }
    }

    /// Poll for a job and execute it if available.
    ///
    /// Returns whether a job was claimed.
    async fn poll_and_execute(&self, semaphore: &Arc<Semaphore>) -> bool {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => return false,
        };

        match self.queue.dequeue().await {
            Ok(Some(job)) => {
                let queue = Arc::clone(&self.queue);
                let executor = Arc::clone(&self.executor);

                tokio::spawn(async move {
                    let _permit = permit;
                    let outcome = executor.execute(&job).await;
                    settle(&*queue, &job, outcome).await;
                });
                true
            }
            Ok(None) => {
                tracing::trace!("No jobs available");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to dequeue job");
                false
            }
        }
    }
}

/// What to record for a finished run.
#[derive(Debug, PartialEq)]
enum Settlement {
    Complete,
    Retry(String),
    Fail(String),
}

/// Transient failures go back to pending while attempts remain; every other
/// failure is final.
fn settlement(job: &Job, outcome: &Result<Option<Value>, JobExecutionError>) -> Settlement {
    match outcome {
        Ok(_) => Settlement::Complete,
        Err(JobExecutionError::Transient(msg)) if job.has_attempts_left() => {
            Settlement::Retry(msg.clone())
        }
        Err(JobExecutionError::Transient(msg)) | Err(JobExecutionError::Permanent(msg)) => {
            Settlement::Fail(msg.clone())
        }
        Err(JobExecutionError::Internal(err)) => Settlement::Fail(err.message.clone()),
    }
}

/// Record the outcome of a job run.
async fn settle(
    queue: &dyn WorkQueue,
    job: &Job,
    outcome: Result<Option<Value>, JobExecutionError>,
) {
    let job_id = job.id;
    let stored = match settlement(job, &outcome) {
        Settlement::Complete => {
            let result = outcome.ok().flatten();
            tracing::info!(job_id = %job_id, job_type = %job.job_type, result = ?result, "Job completed");
            queue.complete(job_id).await
        }
        Settlement::Retry(msg) => {
            tracing::warn!(job_id = %job_id, error = %msg, "Job failed, will retry");
            queue.retry(job_id, &msg).await
        }
        Settlement::Fail(msg) => {
            tracing::error!(job_id = %job_id, attempts = job.attempts, error = %msg, "Job failed");
            queue.fail(job_id, &msg).await
        }
    };

    if let Err(e) = stored {
        tracing::error!(job_id = %job_id, error = %e, "Failed to record job outcome");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use cabinet_core::error::AppError;
    use cabinet_core::result::AppResult;
    use uuid::Uuid;

    use super::*;
    use crate::executor::JobHandler;
    use crate::executor::tests::running_job;

    /// In-memory queue recording what the runner reports.
    #[derive(Debug, Default)]
    struct MemoryQueue {
        pending: Mutex<VecDeque<Job>>,
        completed: Mutex<Vec<Uuid>>,
        failed: Mutex<Vec<(Uuid, String)>>,
        retried: Mutex<Vec<(Uuid, String)>>,
        sweeps: Mutex<Vec<Duration>>,
    }

    impl MemoryQueue {
        fn with_jobs(jobs: Vec<Job>) -> Arc<Self> {
            Arc::new(Self {
                pending: Mutex::new(jobs.into()),
                ..Self::default()
            })
        }

        fn settled(&self) -> usize {
            self.completed.lock().unwrap().len()
                + self.failed.lock().unwrap().len()
                + self.retried.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl WorkQueue for MemoryQueue {
        fn worker_id(&self) -> &str {
            "test-worker"
        }

        async fn dequeue(&self) -> AppResult<Option<Job>> {
            Ok(self.pending.lock().unwrap().pop_front())
        }

        async fn complete(&self, job_id: Uuid) -> AppResult<()> {
            self.completed.lock().unwrap().push(job_id);
            Ok(())
        }

        async fn fail(&self, job_id: Uuid, error: &str) -> AppResult<()> {
            self.failed.lock().unwrap().push((job_id, error.to_string()));
            Ok(())
        }

        async fn retry(&self, job_id: Uuid, error: &str) -> AppResult<()> {
            self.retried.lock().unwrap().push((job_id, error.to_string()));
            Ok(())
        }

        async fn requeue_stalled(&self, stalled_after: Duration) -> AppResult<u64> {
            self.sweeps.lock().unwrap().push(stalled_after);
            Ok(0)
        }
    }

    /// Fails the way its job type says.
    #[derive(Debug)]
    struct Scripted(&'static str);

    #[async_trait]
    impl JobHandler for Scripted {
        fn job_type(&self) -> &str {
            self.0
        }

        async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
            match self.0 {
                "ok" => Ok(None),
                "slow" => {
                    time::sleep(Duration::from_millis(200)).await;
                    Ok(None)
                }
                "broken" => Err(JobExecutionError::Permanent("bad payload".into())),
                "flaky" => Err(JobExecutionError::Transient("try later".into())),
                _ => Err(AppError::internal("disk on fire").into()),
            }
        }
    }

    fn executor() -> Arc<JobExecutor> {
        let mut executor = JobExecutor::new();
        for kind in ["ok", "slow", "broken", "flaky", "internal"] {
            executor.register(Arc::new(Scripted(kind)));
        }
        Arc::new(executor)
    }

    fn job_with_attempts(job_type: &str, attempts: i32, max_attempts: i32) -> Job {
        let mut job = running_job(job_type, Value::Null);
        job.attempts = attempts;
        job.max_attempts = max_attempts;
        job
    }

    async fn wait_for(mut done: impl FnMut() -> bool) {
        time::timeout(Duration::from_secs(5), async {
            while !done() {
                time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[test]
    fn test_success_completes() {
        let job = running_job("ok", Value::Null);
        assert_eq!(settlement(&job, &Ok(None)), Settlement::Complete);
        assert_eq!(
            settlement(&job, &Ok(Some(serde_json::json!({"derivatives": []})))),
            Settlement::Complete
        );
    }

    #[test]
    fn test_permanent_failure_is_final() {
        let job = job_with_attempts("broken", 1, 3);
        let outcome = Err(JobExecutionError::Permanent("bad payload".into()));
        assert_eq!(
            settlement(&job, &outcome),
            Settlement::Fail("bad payload".into())
        );
    }

    #[test]
    fn test_transient_failure_retries_while_attempts_remain() {
        let job = job_with_attempts("flaky", 1, 3);
        let outcome = Err(JobExecutionError::Transient("try later".into()));
        assert_eq!(
            settlement(&job, &outcome),
            Settlement::Retry("try later".into())
        );
    }

    #[test]
    fn test_transient_failure_on_single_attempt_job_fails() {
        let job = job_with_attempts("flaky", 1, 1);
        let outcome = Err(JobExecutionError::Transient("try later".into()));
        assert_eq!(
            settlement(&job, &outcome),
            Settlement::Fail("try later".into())
        );
    }

    #[test]
    fn test_internal_error_fails_with_its_message() {
        let job = job_with_attempts("internal", 1, 3);
        let outcome = Err(JobExecutionError::Internal(AppError::internal("disk on fire")));
        assert_eq!(
            settlement(&job, &outcome),
            Settlement::Fail("disk on fire".into())
        );
    }

    #[tokio::test]
    async fn test_settle_records_on_queue() {
        let queue = MemoryQueue::with_jobs(vec![]);
        let done = running_job("ok", Value::Null);
        let broken = job_with_attempts("flaky", 1, 1);

        settle(&*queue, &done, Ok(None)).await;
        settle(
            &*queue,
            &broken,
            Err(JobExecutionError::Transient("try later".into())),
        )
        .await;

        assert_eq!(*queue.completed.lock().unwrap(), vec![done.id]);
        assert_eq!(
            *queue.failed.lock().unwrap(),
            vec![(broken.id, "try later".to_string())]
        );
        assert!(queue.retried.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_settles_claimed_jobs_until_cancelled() {
        let ok = running_job("ok", Value::Null);
        let broken = running_job("broken", Value::Null);
        let flaky = job_with_attempts("flaky", 1, 2);
        let internal = running_job("internal", Value::Null);
        let queue = MemoryQueue::with_jobs(vec![
            ok.clone(),
            broken.clone(),
            flaky.clone(),
            internal.clone(),
        ]);

        let runner = WorkerRunner::new(queue.clone(), executor(), WorkerConfig::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(cancel_rx).await });

        wait_for(|| queue.settled() == 4).await;
        cancel_tx.send(true).unwrap();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner did not stop")
            .unwrap();

        assert_eq!(*queue.completed.lock().unwrap(), vec![ok.id]);
        assert_eq!(
            *queue.retried.lock().unwrap(),
            vec![(flaky.id, "try later".to_string())]
        );
        let mut failed = queue.failed.lock().unwrap().clone();
        failed.sort_by_key(|(id, _)| *id == internal.id);
        assert_eq!(
            failed,
            vec![
                (broken.id, "bad payload".to_string()),
                (internal.id, "disk on fire".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_drains_in_flight_job() {
        let slow = running_job("slow", Value::Null);
        let queue = MemoryQueue::with_jobs(vec![slow.clone()]);

        let runner = WorkerRunner::new(queue.clone(), executor(), WorkerConfig::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(cancel_rx).await });

        wait_for(|| queue.pending.lock().unwrap().is_empty()).await;
        cancel_tx.send(true).unwrap();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner did not stop")
            .unwrap();

        assert_eq!(*queue.completed.lock().unwrap(), vec![slow.id]);
    }

    #[tokio::test]
    async fn test_dropped_cancel_sender_stops_runner() {
        let queue = MemoryQueue::with_jobs(vec![]);
        let runner = WorkerRunner::new(queue, executor(), WorkerConfig::default());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(cancel_rx).await });

        drop(cancel_tx);
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stalled_jobs_are_swept() {
        let queue = MemoryQueue::with_jobs(vec![]);
        let config = WorkerConfig {
            stalled_after_seconds: 0,
            ..WorkerConfig::default()
        };
        let runner = WorkerRunner::new(queue.clone(), executor(), config);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(cancel_rx).await });

        wait_for(|| !queue.sweeps.lock().unwrap().is_empty()).await;
        cancel_tx.send(true).unwrap();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner did not stop")
            .unwrap();

        assert!(
            queue
                .sweeps
                .lock()
                .unwrap()
                .iter()
                .all(|d| *d == Duration::ZERO)
        );
    }
}
