//! In-process job queue for sync requests.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};
use tracing;
use uuid::Uuid;

use sharemirror_core::error::AppError;

/// Work a job asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobKind {
    /// Deep sync of one location from its root.
    SyncLocation {
        /// Target location.
        location_id: Uuid,
    },
    /// Sync of a single node.
    SyncNode {
        /// Target node.
        node_id: Uuid,
        /// Only reconcile direct children.
        lazy: bool,
    },
    /// Fan out one `SyncLocation` job per location.
    SyncAllLocations,
}

impl JobKind {
    /// Handler key for this kind.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::SyncLocation { .. } => "sync_location",
            Self::SyncNode { .. } => "sync_node",
            Self::SyncAllLocations => "sync_all_locations",
        }
    }
}

/// A queued unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Job identifier.
    pub id: Uuid,
    /// What to do.
    pub kind: JobKind,
    /// Failed attempts so far.
    pub attempts: u32,
    /// Attempts before the job is dropped.
    pub max_attempts: u32,
    /// When the job was first enqueued.
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    /// Handler key of the job's kind.
    pub fn job_type(&self) -> &'static str {
        self.kind.job_type()
    }

    /// Whether another attempt is allowed after the current one fails.
    pub fn can_retry(&self) -> bool {
        self.attempts + 1 < self.max_attempts
    }
}

/// FIFO queue shared by producers (HTTP, scheduler) and the worker.
#[derive(Debug)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<Job>,
    receiver: Mutex<mpsc::UnboundedReceiver<Job>>,
    pending: AtomicUsize,
    max_attempts: u32,
}

impl JobQueue {
    /// Create a queue whose jobs get `max_attempts` attempts each.
    pub fn new(max_attempts: u32) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            pending: AtomicUsize::new(0),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Enqueue a new job.
    pub fn enqueue(&self, kind: JobKind) -> Result<Job, AppError> {
        let job = Job {
            id: Uuid::new_v4(),
            kind,
            attempts: 0,
            max_attempts: self.max_attempts,
            enqueued_at: Utc::now(),
        };
        self.push(job.clone())?;

        tracing::debug!(
            "Enqueued job: id={}, type='{}'",
            job.id,
            job.job_type()
        );
        Ok(job)
    }

    /// Put a failed job back with its attempt counter bumped.
    pub fn requeue(&self, mut job: Job) -> Result<(), AppError> {
        job.attempts += 1;
        tracing::debug!(
            "Requeued job: id={}, type='{}', attempt={}/{}",
            job.id,
            job.job_type(),
            job.attempts + 1,
            job.max_attempts
        );
        self.push(job)
    }

    /// Wait for the next job.
    pub async fn dequeue(&self) -> Option<Job> {
        let job = self.receiver.lock().await.recv().await?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(job)
    }

    /// Take the next job if one is waiting.
    pub async fn try_dequeue(&self) -> Option<Job> {
        let job = self.receiver.lock().await.try_recv().ok()?;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Some(job)
    }

    /// Jobs waiting to be picked up.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn push(&self, job: Job) -> Result<(), AppError> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.sender.send(job).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            AppError::service_unavailable("Job queue is closed")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order_and_pending_count() {
        let queue = JobQueue::new(3);
        let location_id = Uuid::new_v4();
        queue.enqueue(JobKind::SyncAllLocations).unwrap();
        queue.enqueue(JobKind::SyncLocation { location_id }).unwrap();
        assert_eq!(queue.pending(), 2);

        assert_eq!(queue.dequeue().await.unwrap().kind, JobKind::SyncAllLocations);
        let second = queue.dequeue().await.unwrap();
        assert_eq!(second.kind, JobKind::SyncLocation { location_id });
        assert_eq!(second.max_attempts, 3);
        assert_eq!(queue.pending(), 0);
        assert!(queue.try_dequeue().await.is_none());
    }

    #[tokio::test]
    async fn test_requeue_counts_attempts() {
        let queue = JobQueue::new(2);
        let job = queue.enqueue(JobKind::SyncAllLocations).unwrap();
        assert!(job.can_retry());

        let first = queue.try_dequeue().await.unwrap();
        assert_eq!(first.attempts, 0);
        assert_eq!(queue.pending(), 0);

        queue.requeue(first).unwrap();
        assert_eq!(queue.pending(), 1);
        let retried = queue.try_dequeue().await.unwrap();
        assert_eq!(retried.id, job.id);
        assert_eq!(retried.attempts, 1);
        assert!(!retried.can_retry());
    }

    #[test]
    fn test_kind_wire_format() {
        let node_id = Uuid::new_v4();
        let kind = JobKind::SyncNode {
            node_id,
            lazy: true,
        };
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value["type"], "sync_node");
        assert_eq!(value["lazy"], true);
        assert_eq!(kind.job_type(), "sync_node");
        assert_eq!(JobKind::SyncAllLocations.job_type(), "sync_all_locations");
    }
}
