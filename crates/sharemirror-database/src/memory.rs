//! In-memory store for development, tests, and single-process deployments.
//!
//! Enforces the same constraints as the PostgreSQL schema: unique location
//! name and server, unique sibling names, one root per location, and
//! cascading deletes from a location to its nodes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use sharemirror_core::error::AppError;
use sharemirror_core::result::AppResult;
use sharemirror_entity::location::{CreateLocation, Location};
use sharemirror_entity::path_node::{CreatePathNode, PathNode};

use crate::store::{LocationStore, PathNodeStore};

#[derive(Debug, Default)]
struct State {
    locations: HashMap<Uuid, Location>,
    nodes: HashMap<Uuid, PathNode>,
}

/// Shared in-memory implementation of both store traits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Location>> {
        Ok(self.state.read().await.locations.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<Location>> {
        let state = self.state.read().await;
        let mut locations: Vec<Location> = state.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    async fn create(&self, data: &CreateLocation) -> AppResult<Location> {
        let mut state = self.state.write().await;
        for existing in state.locations.values() {
            if existing.name == data.name {
                return Err(AppError::conflict(format!(
                    "Location '{}' already exists",
                    data.name
                )));
            }
            if existing.server_name == data.server_name {
                return Err(AppError::conflict(format!(
                    "A location for server '{}' already exists",
                    data.server_name
                )));
            }
        }

        let location = Location {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            server_name: data.server_name.clone(),
            share_name: data.share_name.clone(),
            user_id: data.user_id.clone(),
            password: data.password.clone(),
            last_sync: None,
            last_sync_complete: false,
            root_node_id: None,
            created_at: Utc::now(),
        };
        state.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn set_root_node(&self, location_id: Uuid, node_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let location = state
            .locations
            .get_mut(&location_id)
            .ok_or_else(|| AppError::not_found(format!("Location {location_id} not found")))?;
        location.root_node_id = Some(node_id);
        Ok(())
    }

    async fn record_sync(
        &self,
        location_id: Uuid,
        synced_at: DateTime<Utc>,
        complete: bool,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let location = state
            .locations
            .get_mut(&location_id)
            .ok_or_else(|| AppError::not_found(format!("Location {location_id} not found")))?;
        location.last_sync = Some(synced_at);
        location.last_sync_complete = complete;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.locations.remove(&id).is_none() {
            return Ok(false);
        }
        state.nodes.retain(|_, node| node.location_id != id);
        Ok(true)
    }
}

#[async_trait]
impl PathNodeStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PathNode>> {
        Ok(self.state.read().await.nodes.get(&id).cloned())
    }

    async fn find_root(&self, location_id: Uuid) -> AppResult<Option<PathNode>> {
        let state = self.state.read().await;
        Ok(state
            .nodes
            .values()
            .find(|n| n.location_id == location_id && n.parent_id.is_none())
            .cloned())
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<PathNode>> {
        let state = self.state.read().await;
        let mut children: Vec<PathNode> = state
            .nodes
            .values()
            .filter(|n| n.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn find_child(&self, parent_id: Uuid, name: &str) -> AppResult<Option<PathNode>> {
        let state = self.state.read().await;
        Ok(state
            .nodes
            .values()
            .find(|n| n.parent_id == Some(parent_id) && n.name == name)
            .cloned())
    }

    async fn count_children(&self, parent_id: Uuid) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .nodes
            .values()
            .filter(|n| n.parent_id == Some(parent_id))
            .count() as u64)
    }

    async fn count_for_location(&self, location_id: Uuid) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .nodes
            .values()
            .filter(|n| n.location_id == location_id)
            .count() as u64)
    }

    async fn create(&self, data: &CreatePathNode) -> AppResult<PathNode> {
        let mut state = self.state.write().await;

        if !state.locations.contains_key(&data.location_id) {
            return Err(AppError::not_found(format!(
                "Location {} not found",
                data.location_id
            )));
        }

        match data.parent_id {
            Some(parent_id) => {
                if !state.nodes.contains_key(&parent_id) {
                    return Err(AppError::not_found(format!("Node {parent_id} not found")));
                }
                if state
                    .nodes
                    .values()
                    .any(|n| n.parent_id == Some(parent_id) && n.name == data.name)
                {
                    return Err(AppError::conflict(format!(
                        "Node '{}' already exists",
                        data.path
                    )));
                }
            }
            None => {
                if state
                    .nodes
                    .values()
                    .any(|n| n.location_id == data.location_id && n.parent_id.is_none())
                {
                    return Err(AppError::conflict(format!(
                        "Location {} already has a root node",
                        data.location_id
                    )));
                }
            }
        }

        let node = PathNode {
            id: Uuid::new_v4(),
            location_id: data.location_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            path: data.path.clone(),
            depth: data.depth,
            is_imported: false,
            created_at: Utc::now(),
        };
        state.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    async fn set_imported(&self, id: Uuid, imported: bool) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.nodes.get_mut(&id) {
            Some(node) => {
                node.is_imported = imported;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharemirror_core::error::ErrorKind;

    fn new_location(name: &str, server: &str) -> CreateLocation {
        CreateLocation {
            name: name.into(),
            server_name: server.into(),
            share_name: "exports".into(),
            user_id: "svc".into(),
            password: "pw".into(),
        }
    }

    #[tokio::test]
    async fn test_location_uniqueness() {
        let store = MemoryStore::new();
        LocationStore::create(&store, &new_location("Radiology", "pacs01"))
            .await
            .unwrap();

        let dup_name = LocationStore::create(&store, &new_location("Radiology", "pacs02")).await;
        assert_eq!(dup_name.unwrap_err().kind, ErrorKind::Conflict);

        let dup_server = LocationStore::create(&store, &new_location("Cardio", "pacs01")).await;
        assert_eq!(dup_server.unwrap_err().kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_single_root_and_sibling_uniqueness() {
        let store = MemoryStore::new();
        let location = LocationStore::create(&store, &new_location("Radiology", "pacs01"))
            .await
            .unwrap();

        let root = PathNodeStore::create(&store, &CreatePathNode::root(location.id))
            .await
            .unwrap();
        let second = PathNodeStore::create(&store, &CreatePathNode::root(location.id)).await;
        assert!(second.unwrap_err().is_conflict());

        PathNodeStore::create(&store, &CreatePathNode::child_of(&root, "reports"))
            .await
            .unwrap();
        let dup = PathNodeStore::create(&store, &CreatePathNode::child_of(&root, "reports")).await;
        assert!(dup.unwrap_err().is_conflict());

        // Sibling names are compared exactly.
        PathNodeStore::create(&store, &CreatePathNode::child_of(&root, "Reports"))
            .await
            .unwrap();
        assert_eq!(store.count_children(root.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_children_are_name_ordered() {
        let store = MemoryStore::new();
        let location = LocationStore::create(&store, &new_location("Radiology", "pacs01"))
            .await
            .unwrap();
        let root = PathNodeStore::create(&store, &CreatePathNode::root(location.id))
            .await
            .unwrap();
        for name in ["b.dcm", "a.dcm", "c"] {
            PathNodeStore::create(&store, &CreatePathNode::child_of(&root, name))
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .find_children(root.id)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["a.dcm", "b.dcm", "c"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_nodes() {
        let store = MemoryStore::new();
        let location = LocationStore::create(&store, &new_location("Radiology", "pacs01"))
            .await
            .unwrap();
        let root = PathNodeStore::create(&store, &CreatePathNode::root(location.id))
            .await
            .unwrap();
        PathNodeStore::create(&store, &CreatePathNode::child_of(&root, "reports"))
            .await
            .unwrap();

        assert!(LocationStore::delete(&store, location.id).await.unwrap());
        assert_eq!(store.count_for_location(location.id).await.unwrap(), 0);
        assert!(!LocationStore::delete(&store, location.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_sync_and_import_flag() {
        let store = MemoryStore::new();
        let location = LocationStore::create(&store, &new_location("Radiology", "pacs01"))
            .await
            .unwrap();
        let now = Utc::now();
        store.record_sync(location.id, now, false).await.unwrap();

        let reloaded = LocationStore::find_by_id(&store, location.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.last_sync, Some(now));
        assert!(!reloaded.last_sync_complete);

        let root = PathNodeStore::create(&store, &CreatePathNode::root(location.id))
            .await
            .unwrap();
        assert!(store.set_imported(root.id, true).await.unwrap());
        assert!(
            PathNodeStore::find_by_id(&store, root.id)
                .await
                .unwrap()
                .unwrap()
                .is_imported
        );
        assert!(!store.set_imported(Uuid::new_v4(), true).await.unwrap());
    }
}
