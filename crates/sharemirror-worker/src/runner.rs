//! Worker runner. Pulls jobs off the queue and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};
use tracing;

use sharemirror_core::config::WorkerConfig;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::{Job, JobQueue};

/// Executes queued jobs with bounded concurrency until cancelled.
#[derive(Debug)]
pub struct WorkerRunner {
    queue: Arc<JobQueue>,
    executor: Arc<JobExecutor>,
    concurrency: usize,
    retry_delay: Duration,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(queue: Arc<JobQueue>, executor: Arc<JobExecutor>, config: &WorkerConfig) -> Self {
        Self {
            queue,
            executor,
            concurrency: config.concurrency.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_seconds),
        }
    }

    /// Override the base retry delay
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Run until the cancel signal flips to `true`, then drain in-flight jobs.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Worker started with concurrency={}, retry_delay={}s",
            self.concurrency,
            self.retry_delay.as_secs()
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            let permit = tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                    continue;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let job = tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                    continue;
                }
                job = self.queue.dequeue() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            self.spawn_job(job, permit);
        }

        tracing::info!("Worker waiting for in-flight jobs to complete...");
        let permits = u32::try_from(self.concurrency).unwrap_or(u32::MAX);
        let _ = tokio::time::timeout(Duration::from_secs(30), semaphore.acquire_many(permits)).await;
        tracing::info!("Worker shut down complete");
    }

    fn spawn_job(&self, job: Job, permit: OwnedSemaphorePermit) {
        let queue = Arc::clone(&self.queue);
        let executor = Arc::clone(&self.executor);
        let retry_delay = self.retry_delay;

        tokio::spawn(async move {
            let _permit = permit;
            let job_id = job.id;

            match executor.execute(&job).await {
                Ok(_) => {
                    tracing::info!("Job {} completed successfully", job_id);
                }
                Err(JobExecutionError::Transient(msg)) if job.can_retry() => {
                    let delay = retry_delay * (job.attempts + 1);
                    tracing::warn!(
                        "Job {} failed (transient), retrying in {}s: {}",
                        job_id,
                        delay.as_secs(),
                        msg
                    );
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        if let Err(e) = queue.requeue(job) {
                            tracing::error!("Failed to retry job {}: {}", job_id, e);
                        }
                    });
                }
                Err(JobExecutionError::Transient(msg)) => {
                    tracing::error!(
                        "Job {} failed after {} attempts: {}",
                        job_id,
                        job.max_attempts,
                        msg
                    );
                }
                Err(JobExecutionError::Permanent(msg)) => {
                    tracing::error!("Job {} failed permanently: {}", job_id, msg);
                }
                Err(JobExecutionError::Internal(err)) => {
                    tracing::error!("Job {} internal error: {}", job_id, err);
                }
            }
        });
    }
}
