//! Path node repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sharemirror_core::error::{AppError, ErrorKind};
use sharemirror_core::result::AppResult;
use sharemirror_entity::path_node::{CreatePathNode, PathNode};

use crate::store::PathNodeStore;

/// Unique index allowing a single parentless node per location.
const SINGLE_ROOT_INDEX: &str = "path_nodes_single_root";

/// Unique constraint on sibling names.
const SIBLING_NAME_KEY: &str = "path_nodes_parent_id_name_key";

/// Repository for mirrored tree nodes.
#[derive(Debug, Clone)]
pub struct PathNodeRepository {
    pool: PgPool,
}

impl PathNodeRepository {
    /// Create a new path node repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PathNodeStore for PathNodeRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PathNode>> {
        sqlx::query_as::<_, PathNode>("SELECT * FROM path_nodes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find node", e))
    }

    async fn find_root(&self, location_id: Uuid) -> AppResult<Option<PathNode>> {
        sqlx::query_as::<_, PathNode>(
            "SELECT * FROM path_nodes WHERE location_id = $1 AND parent_id IS NULL",
        )
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find root node", e))
    }

    async fn find_children(&self, parent_id: Uuid) -> AppResult<Vec<PathNode>> {
        sqlx::query_as::<_, PathNode>(
            "SELECT * FROM path_nodes WHERE parent_id = $1 ORDER BY name COLLATE \"C\" ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }

    async fn find_child(&self, parent_id: Uuid, name: &str) -> AppResult<Option<PathNode>> {
        sqlx::query_as::<_, PathNode>(
            "SELECT * FROM path_nodes WHERE parent_id = $1 AND name = $2",
        )
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find child node", e))
    }

    async fn count_children(&self, parent_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM path_nodes WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count children", e)
            })?;
        Ok(count as u64)
    }

    async fn count_for_location(&self, location_id: Uuid) -> AppResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM path_nodes WHERE location_id = $1")
                .bind(location_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count nodes", e)
                })?;
        Ok(count as u64)
    }

    async fn create(&self, data: &CreatePathNode) -> AppResult<PathNode> {
        sqlx::query_as::<_, PathNode>(
            "INSERT INTO path_nodes (location_id, parent_id, name, path, depth) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.location_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.path)
        .bind(data.depth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(SIBLING_NAME_KEY) =>
            {
                AppError::conflict(format!("Node '{}' already exists", data.path))
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(SINGLE_ROOT_INDEX) =>
            {
                AppError::conflict(format!(
                    "Location {} already has a root node",
                    data.location_id
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create node", e),
        })
    }

    async fn set_imported(&self, id: Uuid, imported: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE path_nodes SET is_imported = $2 WHERE id = $1")
            .bind(id)
            .bind(imported)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update import flag", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
