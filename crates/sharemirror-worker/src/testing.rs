//! Shared fixtures for worker tests.

use std::sync::Arc;

use sharemirror_core::config::RemoteConfig;
use sharemirror_database::MemoryStore;
use sharemirror_entity::location::{CreateLocation, Location};
use sharemirror_remote::MemoryShareConnector;
use sharemirror_service::MirrorService;

pub const SERVER: &str = "pacs01";
pub const SHARE: &str = "exports";

pub struct Fixture {
    pub store: MemoryStore,
    pub remote: MemoryShareConnector,
    pub mirror: Arc<MirrorService>,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let remote = MemoryShareConnector::new();
        remote.add_share(SERVER, SHARE).await;
        let mirror = Arc::new(MirrorService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(remote.clone()),
            RemoteConfig::default(),
        ));
        Self {
            store,
            remote,
            mirror,
        }
    }

    pub async fn location(&self, name: &str, server_name: &str) -> Location {
        self.mirror
            .create_location(&CreateLocation {
                name: name.into(),
                server_name: server_name.into(),
                share_name: SHARE.into(),
                user_id: "svc".into(),
                password: "pw".into(),
            })
            .await
            .unwrap()
    }
}
