//! Outcome of a synchronization run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What a sync did and which branches it could not reach.
///
/// `root_listed` is the boolean result of syncing the starting node: it is
/// `true` once that node's own directory was listed, even if deeper
/// branches failed. Use [`SyncReport::is_complete`] to tell a full sync from
/// a partial one.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Location the synced node belongs to.
    pub location_id: Uuid,
    /// Node the sync started from.
    pub node_id: Uuid,
    /// Whether the sync was limited to one level.
    pub lazy: bool,
    /// Whether the starting directory was listed.
    pub root_listed: bool,
    /// Directories listed successfully.
    pub directories_listed: u64,
    /// Nodes created by this run.
    pub nodes_created: u64,
    /// Existing nodes matched to remote entries.
    pub nodes_reused: u64,
    /// Directories that could not be listed.
    pub failed_paths: Vec<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run returned.
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Start a report for `node_id`.
    pub fn begin(location_id: Uuid, node_id: Uuid, lazy: bool) -> Self {
        let now = Utc::now();
        Self {
            location_id,
            node_id,
            lazy,
            root_listed: false,
            directories_listed: 0,
            nodes_created: 0,
            nodes_reused: 0,
            failed_paths: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Stamp the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Whether every directory the run attempted was listed.
    pub fn is_complete(&self) -> bool {
        self.root_listed && self.failed_paths.is_empty()
    }

    /// Wall-clock duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
