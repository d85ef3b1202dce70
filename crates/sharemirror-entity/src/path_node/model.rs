//! Path node entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::class::NodeClass;

/// Name of every tree root; it stands for the share root directory.
pub const ROOT_NAME: &str = ".";

/// One file or directory in the mirrored tree of a location.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PathNode {
    /// Unique node identifier.
    pub id: Uuid,
    /// Location whose tree this node belongs to.
    pub location_id: Uuid,
    /// Parent node (null for the root).
    pub parent_id: Option<Uuid>,
    /// Base name as reported by the remote listing, `.` for the root.
    pub name: String,
    /// Materialized full path relative to the share (e.g. `./reports/a.dcm`).
    pub path: String,
    /// Depth in the tree (0 for the root).
    pub depth: i32,
    /// Set by the external import process.
    pub is_imported: bool,
    /// When the node was created.
    pub created_at: DateTime<Utc>,
}

impl PathNode {
    /// Check if this is the root node.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Path of this node relative to the share root.
    pub fn full_path(&self) -> &str {
        &self.path
    }

    /// The directory containing this node; empty for the root.
    pub fn location_path(&self) -> &str {
        if self.is_root() {
            return "";
        }
        self.path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or(ROOT_NAME)
    }

    /// Materialized path of a child called `name`.
    pub fn child_path(&self, name: &str) -> String {
        format!("{}/{}", self.path, name)
    }

    /// Icon/behaviour classification derived from the name.
    pub fn classification(&self) -> NodeClass {
        if self.is_root() {
            NodeClass::Folder
        } else {
            NodeClass::classify(&self.name)
        }
    }
}

/// Data required to persist a new node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePathNode {
    /// Owning location.
    pub location_id: Uuid,
    /// Parent node (None for the root).
    pub parent_id: Option<Uuid>,
    /// Base name.
    pub name: String,
    /// Materialized full path.
    pub path: String,
    /// Depth in the tree.
    pub depth: i32,
}

impl CreatePathNode {
    /// The root node of a location's tree.
    pub fn root(location_id: Uuid) -> Self {
        Self {
            location_id,
            parent_id: None,
            name: ROOT_NAME.to_string(),
            path: ROOT_NAME.to_string(),
            depth: 0,
        }
    }

    /// A child of `parent` named `name`.
    pub fn child_of(parent: &PathNode, name: &str) -> Self {
        Self {
            location_id: parent.location_id,
            parent_id: Some(parent.id),
            name: name.to_string(),
            path: parent.child_path(name),
            depth: parent.depth + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(data: CreatePathNode) -> PathNode {
        PathNode {
            id: Uuid::new_v4(),
            location_id: data.location_id,
            parent_id: data.parent_id,
            name: data.name,
            path: data.path,
            depth: data.depth,
            is_imported: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_root_paths() {
        let root = node(CreatePathNode::root(Uuid::new_v4()));
        assert!(root.is_root());
        assert_eq!(root.full_path(), ".");
        assert_eq!(root.location_path(), "");
    }

    #[test]
    fn test_nested_paths() {
        let root = node(CreatePathNode::root(Uuid::new_v4()));
        let reports = node(CreatePathNode::child_of(&root, "reports"));
        let scan = node(CreatePathNode::child_of(&reports, "a.dcm"));

        assert_eq!(reports.full_path(), "./reports");
        assert_eq!(reports.location_path(), ".");
        assert_eq!(reports.depth, 1);

        assert_eq!(scan.full_path(), "./reports/a.dcm");
        assert_eq!(scan.location_path(), "./reports");
        assert_eq!(scan.depth, 2);
        assert_eq!(scan.location_id, root.location_id);
    }

    #[test]
    fn test_root_is_always_folder() {
        let root = node(CreatePathNode::root(Uuid::new_v4()));
        assert_eq!(root.classification(), NodeClass::Folder);
    }
}
