//! Store traits the sync engine is written against.
//!
//! Both the PostgreSQL repositories and [`crate::MemoryStore`] implement
//! them with the same guarantees: every write is committed before the call
//! returns, sibling names are unique per parent, and a location has at most
//! one root node. Violations are rejected with `ErrorKind::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sharemirror_core::result::AppResult;
use sharemirror_entity::location::{CreateLocation, Location};
use sharemirror_entity::path_node::{CreatePathNode, PathNode};

/// Persistence for configured locations.
#[async_trait]
pub trait LocationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a location by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Location>>;

    /// List all locations ordered by name.
    async fn find_all(&self) -> AppResult<Vec<Location>>;

    /// Create a location. Name and server name must be unique.
    async fn create(&self, data: &CreateLocation) -> AppResult<Location>;

    /// Point the location at its root node.
    async fn set_root_node(&self, location_id: Uuid, node_id: Uuid) -> AppResult<()>;

    /// Stamp the outcome of a sync attempt.
    async fn record_sync(
        &self,
        location_id: Uuid,
        synced_at: DateTime<Utc>,
        complete: bool,
    ) -> AppResult<()>;

    /// Delete a location together with its tree. Returns `true` if deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Persistence for mirrored tree nodes.
#[async_trait]
pub trait PathNodeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a node by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PathNode>>;

    /// Find the root node of a location's tree.
    async fn find_root(&self, location_id: Uuid) -> AppResult<Option<PathNode>>;

    /// Direct children of a node ordered by name.
    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<PathNode>>;

    /// The child of `parent_id` with exactly this name.
    async fn find_child(&self, parent_id: Uuid, name: &str) -> AppResult<Option<PathNode>>;

    /// Number of direct children.
    async fn count_children(&self, parent_id: Uuid) -> AppResult<u64>;

    /// Number of nodes in a location's tree.
    async fn count_for_location(&self, location_id: Uuid) -> AppResult<u64>;

    /// Persist a new node. Duplicate `(parent, name)` pairs and second
    /// roots are rejected with a conflict.
    async fn create(&self, data: &CreatePathNode) -> AppResult<PathNode>;

    /// Set the import flag. Returns `true` if the node exists.
    async fn set_imported(&self, id: Uuid, imported: bool) -> AppResult<bool>;
}
