//! Shared fixtures for engine tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use sharemirror_core::config::RemoteConfig;
use sharemirror_core::error::AppError;
use sharemirror_core::result::AppResult;
use sharemirror_database::memory::MemoryStore;
use sharemirror_database::store::{LocationStore, PathNodeStore};
use sharemirror_entity::location::{CreateLocation, Location};
use sharemirror_entity::path_node::{CreatePathNode, PathNode};
use sharemirror_remote::MemoryShareConnector;

use crate::location::LocationService;
use crate::mirror::MirrorService;
use crate::remote::RemoteGateway;
use crate::tree::{AvailabilityProbe, ContentRetriever, LocationLocks, NameMatcher, TreeSyncer};
use crate::view::ViewProjector;

pub const SERVER: &str = "pacs01";
pub const SHARE: &str = "exports";

/// One location backed by an in-memory store and share.
pub struct Fixture {
    pub store: MemoryStore,
    pub remote: MemoryShareConnector,
    pub location: Location,
    pub gateway: Arc<RemoteGateway>,
    pub syncer: TreeSyncer,
    pub probe: AvailabilityProbe,
    pub retriever: ContentRetriever,
    pub projector: ViewProjector,
    pub locations: LocationService,
    pub service: MirrorService,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(RemoteConfig::default()).await
    }

    pub async fn with_case_insensitive_names() -> Self {
        Self::with_config(RemoteConfig {
            case_insensitive_names: true,
            ..RemoteConfig::default()
        })
        .await
    }

    async fn with_config(config: RemoteConfig) -> Self {
        let store = MemoryStore::new();
        let remote = MemoryShareConnector::new();
        remote.add_share(SERVER, SHARE).await;

        let location = LocationStore::create(
            &store,
            &CreateLocation {
                name: "Radiology".into(),
                server_name: SERVER.into(),
                share_name: SHARE.into(),
                user_id: "svc".into(),
                password: "pw".into(),
            },
        )
        .await
        .unwrap();

        let location_store: Arc<dyn LocationStore> = Arc::new(store.clone());
        let node_store: Arc<dyn PathNodeStore> = Arc::new(store.clone());
        let names = NameMatcher::new(config.case_insensitive_names);
        let gateway = Arc::new(RemoteGateway::new(
            Arc::new(remote.clone()),
            config.clone(),
        ));
        let syncer = TreeSyncer::new(node_store.clone(), gateway.clone(), names);
        let probe = AvailabilityProbe::new(gateway.clone(), names);

        Self {
            locations: LocationService::new(
                location_store.clone(),
                node_store.clone(),
                gateway.clone(),
                Arc::new(syncer.clone()),
                LocationLocks::new(),
            ),
            projector: ViewProjector::new(node_store.clone(), Arc::new(probe.clone())),
            retriever: ContentRetriever::new(gateway.clone()),
            service: MirrorService::new(
                location_store,
                node_store,
                Arc::new(remote.clone()),
                config,
            ),
            store,
            remote,
            location,
            gateway,
            syncer,
            probe,
        }
    }

    /// The location's root node, created if needed.
    pub async fn root(&self) -> PathNode {
        self.locations
            .ensure_root_node(&self.location)
            .await
            .unwrap()
    }
}

/// Store wrapper that misbehaves on inserts.
#[derive(Debug)]
pub struct ScriptedStore {
    inner: MemoryStore,
    race_on: Option<String>,
    fired: AtomicBool,
}

impl ScriptedStore {
    /// Inserts a competing sibling just before the syncer creates `name`.
    pub fn racing(inner: MemoryStore, name: &str) -> Self {
        Self {
            inner,
            race_on: Some(name.to_string()),
            fired: AtomicBool::new(false),
        }
    }

    /// Fails every insert with a database error.
    pub fn failing(inner: MemoryStore) -> Self {
        Self {
            inner,
            race_on: None,
            fired: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl PathNodeStore for ScriptedStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PathNode>> {
        PathNodeStore::find_by_id(&self.inner, id).await
    }

    async fn find_root(&self, location_id: Uuid) -> AppResult<Option<PathNode>> {
        self.inner.find_root(location_id).await
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<PathNode>> {
        self.inner.find_children(parent_id).await
    }

    async fn find_child(&self, parent_id: Uuid, name: &str) -> AppResult<Option<PathNode>> {
        self.inner.find_child(parent_id, name).await
    }

    async fn count_children(&self, parent_id: Uuid) -> AppResult<u64> {
        self.inner.count_children(parent_id).await
    }

    async fn count_for_location(&self, location_id: Uuid) -> AppResult<u64> {
        self.inner.count_for_location(location_id).await
    }

    async fn create(&self, data: &CreatePathNode) -> AppResult<PathNode> {
        match &self.race_on {
            Some(name) => {
                if *name == data.name && !self.fired.swap(true, Ordering::SeqCst) {
                    PathNodeStore::create(&self.inner, data).await?;
                }
                PathNodeStore::create(&self.inner, data).await
            }
            None => Err(AppError::database("insert rejected")),
        }
    }

    async fn set_imported(&self, id: Uuid, imported: bool) -> AppResult<bool> {
        self.inner.set_imported(id, imported).await
    }
}
