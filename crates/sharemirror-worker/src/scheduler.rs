//! Cron scheduler for the periodic full sync.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use sharemirror_core::config::WorkerConfig;
use sharemirror_core::error::AppError;

use crate::queue::{JobKind, JobQueue};

/// Cron-based scheduler that feeds the job queue
pub struct CronScheduler {
    scheduler: JobScheduler,
    queue: Arc<JobQueue>,
    sync_schedule: String,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("sync_schedule", &self.sync_schedule)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(queue: Arc<JobQueue>, config: &WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            queue,
            sync_schedule: config.sync_schedule.clone(),
        })
    }

    /// Register all default scheduled tasks
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        self.register_full_sync().await?;
        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Full sync of every location, on the configured schedule
    async fn register_full_sync(&self) -> Result<(), AppError> {
        let queue = Arc::clone(&self.queue);
        let job = CronJob::new_async(self.sync_schedule.as_str(), move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            Box::pin(async move {
                tracing::debug!("Scheduling full sync job");
                if let Err(e) = queue.enqueue(JobKind::SyncAllLocations) {
                    tracing::error!("Failed to enqueue sync_all_locations: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid sync schedule '{}': {}",
                self.sync_schedule, e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add sync_all_locations schedule: {}", e))
        })?;

        tracing::info!("Registered: sync_all_locations ({})", self.sync_schedule);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharemirror_core::error::ErrorKind;

    #[tokio::test]
    async fn test_registers_configured_schedule() {
        let queue = Arc::new(JobQueue::new(1));
        let scheduler = CronScheduler::new(queue, &WorkerConfig::default())
            .await
            .unwrap();
        scheduler.register_default_tasks().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_invalid_schedule() {
        let queue = Arc::new(JobQueue::new(1));
        let config = WorkerConfig {
            sync_schedule: "every hour".into(),
            ..WorkerConfig::default()
        };
        let scheduler = CronScheduler::new(queue, &config).await.unwrap();
        let err = scheduler.register_default_tasks().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
