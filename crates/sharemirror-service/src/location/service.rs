//! Location lifecycle and top-level synchronization.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use sharemirror_core::error::AppError;
use sharemirror_core::result::AppResult;
use sharemirror_database::store::{LocationStore, PathNodeStore};
use sharemirror_entity::location::{CreateLocation, Location};
use sharemirror_entity::path_node::{CreatePathNode, PathNode};

use crate::remote::RemoteGateway;
use crate::tree::{LocationLocks, SyncReport, TreeSyncer};

/// A location together with a live reachability probe.
#[derive(Debug, Clone, Serialize)]
pub struct LocationStatus {
    /// The stored location.
    pub location: Location,
    /// Whether a session could be opened just now.
    pub connected: bool,
    /// Nodes currently mirrored for the location.
    pub node_count: u64,
}

/// Manages locations and drives full syncs from their roots.
#[derive(Debug, Clone)]
pub struct LocationService {
    locations: Arc<dyn LocationStore>,
    nodes: Arc<dyn PathNodeStore>,
    gateway: Arc<RemoteGateway>,
    syncer: Arc<TreeSyncer>,
    locks: LocationLocks,
}

impl LocationService {
    /// Creates a new location service.
    pub fn new(
        locations: Arc<dyn LocationStore>,
        nodes: Arc<dyn PathNodeStore>,
        gateway: Arc<RemoteGateway>,
        syncer: Arc<TreeSyncer>,
        locks: LocationLocks,
    ) -> Self {
        Self {
            locations,
            nodes,
            gateway,
            syncer,
            locks,
        }
    }

    /// Load a location or fail with `NotFound`.
    pub async fn get(&self, location_id: Uuid) -> AppResult<Location> {
        self.locations
            .find_by_id(location_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Location {location_id} not found")))
    }

    /// All locations ordered by name.
    pub async fn list(&self) -> AppResult<Vec<Location>> {
        self.locations.find_all().await
    }

    /// Register a new location.
    pub async fn create(&self, data: &CreateLocation) -> AppResult<Location> {
        data.validate()?;
        let location = self.locations.create(data).await?;
        info!(location_id = %location.id, name = %location.name, "Location created");
        Ok(location)
    }

    /// Delete a location and its tree.
    pub async fn delete(&self, location_id: Uuid) -> AppResult<()> {
        let _guard = self.locks.acquire(location_id).await;
        if !self.locations.delete(location_id).await? {
            return Err(AppError::not_found(format!(
                "Location {location_id} not found"
            )));
        }
        self.locks.forget(location_id);
        info!(%location_id, "Location deleted");
        Ok(())
    }

    /// Location row plus a live connection probe.
    pub async fn status(&self, location_id: Uuid) -> AppResult<LocationStatus> {
        let location = self.get(location_id).await?;
        let connected = self.gateway.is_connected(&location).await;
        let node_count = self.nodes.count_for_location(location_id).await?;
        Ok(LocationStatus {
            location,
            connected,
            node_count,
        })
    }

    /// Return the location's root node, creating it if absent.
    pub async fn ensure_root_node(&self, location: &Location) -> AppResult<PathNode> {
        let root = match self.nodes.find_root(location.id).await? {
            Some(root) => root,
            None => match self.nodes.create(&CreatePathNode::root(location.id)).await {
                Ok(root) => {
                    info!(location_id = %location.id, node_id = %root.id, "Root node created");
                    root
                }
                Err(e) if e.is_conflict() => self
                    .nodes
                    .find_root(location.id)
                    .await?
                    .ok_or(e)?,
                Err(e) => return Err(e),
            },
        };

        if location.root_node_id != Some(root.id) {
            self.locations.set_root_node(location.id, root.id).await?;
        }
        Ok(root)
    }

    /// Deep-sync the location from its root and stamp `last_sync`.
    ///
    /// The stamp is written whenever the sync returns, partial or not;
    /// `last_sync_complete` records which. Persistence errors abort the sync
    /// and leave the stamp untouched.
    pub async fn sync(&self, location_id: Uuid) -> AppResult<SyncReport> {
        let _guard = self.locks.acquire(location_id).await;
        let location = self.get(location_id).await?;
        let root = self.ensure_root_node(&location).await?;

        let report = self.syncer.sync(&location, &root, false).await?;
        let complete = report.is_complete();
        self.locations
            .record_sync(location_id, report.finished_at, complete)
            .await?;

        if complete {
            info!(%location_id, name = %location.name, "Location synced");
        } else {
            warn!(
                %location_id,
                name = %location.name,
                root_listed = report.root_listed,
                failed = ?report.failed_paths,
                "Location synced partially"
            );
        }
        Ok(report)
    }

    /// Every remote file path of the location, without touching the tree.
    pub async fn list_all_paths(&self, location_id: Uuid) -> AppResult<Option<Vec<String>>> {
        let location = self.get(location_id).await?;
        Ok(self.gateway.list_all_files(&location).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, SERVER, SHARE};
    use sharemirror_core::error::ErrorKind;

    #[tokio::test]
    async fn test_ensure_root_node_is_idempotent() {
        let fx = Fixture::new().await;
        let first = fx.locations.ensure_root_node(&fx.location).await.unwrap();
        let reloaded = fx.locations.get(fx.location.id).await.unwrap();
        assert_eq!(reloaded.root_node_id, Some(first.id));

        let second = fx.locations.ensure_root_node(&reloaded).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.name, ".");
        assert_eq!(first.full_path(), ".");
    }

    #[tokio::test]
    async fn test_sync_stamps_complete_sync() {
        let fx = Fixture::new().await;
        fx.remote.add_file(SERVER, SHARE, "./reports/a.dcm", &b"a"[..]).await;
        fx.remote.add_file(SERVER, SHARE, "./scan.dcm", &b"s"[..]).await;

        let report = fx.locations.sync(fx.location.id).await.unwrap();
        assert!(report.is_complete());

        let location = fx.locations.get(fx.location.id).await.unwrap();
        assert_eq!(location.last_sync, Some(report.finished_at));
        assert!(location.last_sync_complete);

        let root = fx.store.find_root(fx.location.id).await.unwrap().unwrap();
        assert_eq!(fx.store.count_children(root.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_sync_stamps_partial_sync() {
        let fx = Fixture::new().await;
        fx.remote.add_file(SERVER, SHARE, "./locked/a.dcm", &b"a"[..]).await;
        fx.remote.set_list_failure(SERVER, SHARE, "./locked", true).await;

        let report = fx.locations.sync(fx.location.id).await.unwrap();
        assert!(report.root_listed);
        assert!(!report.is_complete());

        let location = fx.locations.get(fx.location.id).await.unwrap();
        assert!(location.has_synced());
        assert!(!location.last_sync_complete);
    }

    #[tokio::test]
    async fn test_sync_of_unreachable_share_still_stamps() {
        let fx = Fixture::new().await;
        fx.remote.set_reachable(SERVER, false).await;

        let report = fx.locations.sync(fx.location.id).await.unwrap();
        assert!(!report.root_listed);

        let location = fx.locations.get(fx.location.id).await.unwrap();
        assert!(location.has_synced());
        assert!(!location.last_sync_complete);
        assert!(location.root_node_id.is_some());
    }

    #[tokio::test]
    async fn test_create_validates_and_rejects_duplicates() {
        let fx = Fixture::new().await;
        let blank = CreateLocation {
            name: " ".into(),
            server_name: "pacs02".into(),
            share_name: "exports".into(),
            user_id: "svc".into(),
            password: "pw".into(),
        };
        assert_eq!(
            fx.locations.create(&blank).await.unwrap_err().kind,
            ErrorKind::Validation
        );

        let duplicate = CreateLocation {
            name: "Radiology".into(),
            ..blank
        };
        assert_eq!(
            fx.locations.create(&duplicate).await.unwrap_err().kind,
            ErrorKind::Conflict
        );
    }

    #[tokio::test]
    async fn test_delete_cascades_and_reports_missing() {
        let fx = Fixture::new().await;
        fx.remote.add_file(SERVER, SHARE, "./a.dcm", &b"a"[..]).await;
        fx.locations.sync(fx.location.id).await.unwrap();

        fx.locations.delete(fx.location.id).await.unwrap();
        assert_eq!(fx.store.count_for_location(fx.location.id).await.unwrap(), 0);
        assert_eq!(
            fx.locations.delete(fx.location.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_status_probes_connection() {
        let fx = Fixture::new().await;
        assert!(fx.locations.status(fx.location.id).await.unwrap().connected);

        fx.remote.set_reachable(SERVER, false).await;
        let status = fx.locations.status(fx.location.id).await.unwrap();
        assert!(!status.connected);
        assert_eq!(status.node_count, 0);
    }

    #[tokio::test]
    async fn test_list_all_paths() {
        let fx = Fixture::new().await;
        fx.remote.add_file(SERVER, SHARE, "./reports/a.dcm", &b"a"[..]).await;

        let paths = fx.locations.list_all_paths(fx.location.id).await.unwrap();
        assert_eq!(paths, Some(vec!["./reports/a.dcm".to_string()]));
        assert_eq!(fx.store.count_for_location(fx.location.id).await.unwrap(), 0);

        fx.remote.set_reachable(SERVER, false).await;
        assert_eq!(fx.locations.list_all_paths(fx.location.id).await.unwrap(), None);
    }
}
