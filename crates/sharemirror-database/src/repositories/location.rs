//! Location repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sharemirror_core::error::{AppError, ErrorKind};
use sharemirror_core::result::AppResult;
use sharemirror_entity::location::{CreateLocation, Location};

use crate::store::LocationStore;

/// Repository for configured share locations.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    /// Create a new location repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for LocationRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Location>> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find location", e))
    }

    async fn find_all(&self) -> AppResult<Vec<Location>> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list locations", e))
    }

    async fn create(&self, data: &CreateLocation) -> AppResult<Location> {
        sqlx::query_as::<_, Location>(
            "INSERT INTO locations (name, server_name, share_name, user_id, password) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.server_name)
        .bind(&data.share_name)
        .bind(&data.user_id)
        .bind(&data.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("locations_name_key") =>
            {
                AppError::conflict(format!("Location '{}' already exists", data.name))
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("locations_server_name_key") =>
            {
                AppError::conflict(format!(
                    "A location for server '{}' already exists",
                    data.server_name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create location", e),
        })
    }

    async fn set_root_node(&self, location_id: Uuid, node_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE locations SET root_node_id = $2 WHERE id = $1")
            .bind(location_id)
            .bind(node_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set location root", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Location {location_id} not found"
            )));
        }
        Ok(())
    }

    async fn record_sync(
        &self,
        location_id: Uuid,
        synced_at: DateTime<Utc>,
        complete: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE locations SET last_sync = $2, last_sync_complete = $3 WHERE id = $1",
        )
        .bind(location_id)
        .bind(synced_at)
        .bind(complete)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record sync", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Location {location_id} not found"
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete location", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
