//! Location and node synchronization jobs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use sharemirror_core::error::AppError;
use sharemirror_service::{MirrorService, SyncReport};

use crate::executor::{JobExecutionError, JobHandler};
use crate::queue::{Job, JobKind, JobQueue};

fn report_value(report: &SyncReport) -> Result<Option<Value>, JobExecutionError> {
    Ok(Some(serde_json::to_value(report).map_err(AppError::from)?))
}

fn unexpected(job: &Job, expected: &str) -> JobExecutionError {
    JobExecutionError::Permanent(format!(
        "Job {} of type '{}' routed to '{}' handler",
        job.id,
        job.job_type(),
        expected
    ))
}

/// Deep-syncs one location.
#[derive(Debug)]
pub struct SyncLocationJobHandler {
    mirror: Arc<MirrorService>,
}

impl SyncLocationJobHandler {
    /// Create a new location sync handler
    pub fn new(mirror: Arc<MirrorService>) -> Self {
        Self { mirror }
    }
}

#[async_trait]
impl JobHandler for SyncLocationJobHandler {
    fn job_type(&self) -> &str {
        "sync_location"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let JobKind::SyncLocation { location_id } = job.kind else {
            return Err(unexpected(job, self.job_type()));
        };

        let report = self
            .mirror
            .sync_location(location_id)
            .await
            .map_err(JobExecutionError::classify)?;

        // The stamp is already written; an unlisted root is still worth retrying.
        if !report.root_listed {
            return Err(JobExecutionError::Transient(format!(
                "Share of location {location_id} could not be listed"
            )));
        }

        tracing::info!(
            "Location {} synced: created={}, failed_paths={}",
            location_id,
            report.nodes_created,
            report.failed_paths.len()
        );
        report_value(&report)
    }
}

/// Syncs a single node, lazily or deeply.
#[derive(Debug)]
pub struct SyncNodeJobHandler {
    mirror: Arc<MirrorService>,
}

impl SyncNodeJobHandler {
    /// Create a new node sync handler
    pub fn new(mirror: Arc<MirrorService>) -> Self {
        Self { mirror }
    }
}

#[async_trait]
impl JobHandler for SyncNodeJobHandler {
    fn job_type(&self) -> &str {
        "sync_node"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let JobKind::SyncNode { node_id, lazy } = job.kind else {
            return Err(unexpected(job, self.job_type()));
        };

        let report = self
            .mirror
            .sync_node(node_id, lazy)
            .await
            .map_err(JobExecutionError::classify)?;

        if !report.root_listed {
            return Err(JobExecutionError::Transient(format!(
                "Directory of node {node_id} could not be listed"
            )));
        }
        report_value(&report)
    }
}

/// Enqueues a location sync for every location.
#[derive(Debug)]
pub struct SyncAllLocationsJobHandler {
    mirror: Arc<MirrorService>,
    queue: Arc<JobQueue>,
}

impl SyncAllLocationsJobHandler {
    /// Create a new fan-out handler
    pub fn new(mirror: Arc<MirrorService>, queue: Arc<JobQueue>) -> Self {
        Self { mirror, queue }
    }
}

#[async_trait]
impl JobHandler for SyncAllLocationsJobHandler {
    fn job_type(&self) -> &str {
        "sync_all_locations"
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let locations = self
            .mirror
            .list_locations()
            .await
            .map_err(JobExecutionError::classify)?;

        for location in &locations {
            self.queue.enqueue(JobKind::SyncLocation {
                location_id: location.id,
            })?;
        }

        tracing::info!("Enqueued sync for {} locations", locations.len());
        Ok(Some(serde_json::json!({ "enqueued": locations.len() })))
    }
}
