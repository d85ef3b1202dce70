//! Invocation surface used by the HTTP layer and the worker.

use std::sync::Arc;

use uuid::Uuid;

use sharemirror_core::config::RemoteConfig;
use sharemirror_core::error::AppError;
use sharemirror_core::result::AppResult;
use sharemirror_core::traits::share::ShareConnector;
use sharemirror_database::store::{LocationStore, PathNodeStore};
use sharemirror_entity::location::{CreateLocation, Location};
use sharemirror_entity::path_node::PathNode;
use sharemirror_entity::view::ViewNode;

use crate::location::{LocationService, LocationStatus};
use crate::remote::RemoteGateway;
use crate::tree::{
    AvailabilityProbe, ContentRetriever, LocationLocks, NameMatcher, RetrievedContents,
    SyncReport, TreeSyncer,
};
use crate::view::ViewProjector;

/// Facade over the engine, addressed by location and node identifiers.
#[derive(Debug, Clone)]
pub struct MirrorService {
    nodes: Arc<dyn PathNodeStore>,
    locations: LocationService,
    syncer: Arc<TreeSyncer>,
    probe: Arc<AvailabilityProbe>,
    retriever: ContentRetriever,
    projector: ViewProjector,
    locks: LocationLocks,
}

impl MirrorService {
    /// Wire the engine from its stores, a connector and remote settings.
    pub fn new(
        location_store: Arc<dyn LocationStore>,
        node_store: Arc<dyn PathNodeStore>,
        connector: Arc<dyn ShareConnector>,
        config: RemoteConfig,
    ) -> Self {
        let names = NameMatcher::new(config.case_insensitive_names);
        let gateway = Arc::new(RemoteGateway::new(connector, config));
        let syncer = Arc::new(TreeSyncer::new(
            Arc::clone(&node_store),
            Arc::clone(&gateway),
            names,
        ));
        let probe = Arc::new(AvailabilityProbe::new(Arc::clone(&gateway), names));
        let locks = LocationLocks::new();

        Self {
            locations: LocationService::new(
                location_store,
                Arc::clone(&node_store),
                Arc::clone(&gateway),
                Arc::clone(&syncer),
                locks.clone(),
            ),
            retriever: ContentRetriever::new(gateway),
            projector: ViewProjector::new(Arc::clone(&node_store), Arc::clone(&probe)),
            nodes: node_store,
            syncer,
            probe,
            locks,
        }
    }

    /// The location service.
    pub fn locations(&self) -> &LocationService {
        &self.locations
    }

    /// Deep-sync a location from its root.
    pub async fn sync_location(&self, location_id: Uuid) -> AppResult<SyncReport> {
        self.locations.sync(location_id).await
    }

    /// Sync a single node, lazily or deeply.
    pub async fn sync_node(&self, node_id: Uuid, lazy: bool) -> AppResult<SyncReport> {
        let node = self.node(node_id).await?;
        let _guard = self.locks.acquire(node.location_id).await;
        let location = self.locations.get(node.location_id).await?;
        self.syncer.sync(&location, &node, lazy).await
    }

    /// Project one node.
    pub async fn get_node_view(&self, node_id: Uuid, lazy: bool) -> AppResult<ViewNode> {
        let (location, node) = self.node_with_location(node_id).await?;
        self.projector.project(&location, &node, lazy).await
    }

    /// One lazy root view per location, creating roots on demand.
    pub async fn list_root_views(&self) -> AppResult<Vec<ViewNode>> {
        let locations = self.locations.list().await?;
        let mut views = Vec::with_capacity(locations.len());
        for location in locations {
            let root = self.locations.ensure_root_node(&location).await?;
            views.push(self.projector.project(&location, &root, true).await?);
        }
        Ok(views)
    }

    /// The fully expanded tree of a location.
    pub async fn location_tree(&self, location_id: Uuid) -> AppResult<ViewNode> {
        let location = self.locations.get(location_id).await?;
        let root = self.locations.ensure_root_node(&location).await?;
        self.projector.project(&location, &root, false).await
    }

    /// Every remote file path of a location.
    pub async fn list_all_paths(&self, location_id: Uuid) -> AppResult<Option<Vec<String>>> {
        self.locations.list_all_paths(location_id).await
    }

    /// Copy a node's remote file into a temporary file.
    pub async fn retrieve_node_contents(
        &self,
        node_id: Uuid,
    ) -> AppResult<Option<RetrievedContents>> {
        let (location, node) = self.node_with_location(node_id).await?;
        self.retriever.retrieve(&location, &node).await
    }

    /// Whether a node still exists on the share.
    pub async fn is_node_available(&self, node_id: Uuid) -> AppResult<bool> {
        let (location, node) = self.node_with_location(node_id).await?;
        Ok(self.probe.is_available(&location, &node).await)
    }

    /// All locations ordered by name.
    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        self.locations.list().await
    }

    /// Location row plus a live connection probe.
    pub async fn location_status(&self, location_id: Uuid) -> AppResult<LocationStatus> {
        self.locations.status(location_id).await
    }

    /// Register a location.
    pub async fn create_location(&self, data: &CreateLocation) -> AppResult<Location> {
        self.locations.create(data).await
    }

    /// Delete a location and its tree.
    pub async fn delete_location(&self, location_id: Uuid) -> AppResult<()> {
        self.locations.delete(location_id).await
    }

    /// Load a node or fail with `NotFound`.
    pub async fn node(&self, node_id: Uuid) -> AppResult<PathNode> {
        self.nodes
            .find_by_id(node_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Node {node_id} not found")))
    }

    async fn node_with_location(&self, node_id: Uuid) -> AppResult<(Location, PathNode)> {
        let node = self.node(node_id).await?;
        let location = self.locations.get(node.location_id).await?;
        Ok((location, node))
    }
}
