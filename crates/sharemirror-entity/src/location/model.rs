//! Location entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use sharemirror_core::error::AppError;
use sharemirror_core::traits::share::ShareCredentials;

/// One configured remote share and the root of its mirrored tree.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    /// Unique location identifier.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Unique server host name.
    pub server_name: String,
    /// Share name on the server.
    pub share_name: String,
    /// Account used to open sessions.
    pub user_id: String,
    /// Password for `user_id`. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// When the last sync attempt returned.
    pub last_sync: Option<DateTime<Utc>>,
    /// Whether that attempt reached every branch of the tree.
    pub last_sync_complete: bool,
    /// Root node of the mirrored tree (created on first sync).
    pub root_node_id: Option<Uuid>,
    /// When the location was created.
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Credentials handed to the share connector.
    pub fn credentials(&self) -> ShareCredentials {
        ShareCredentials {
            server_name: self.server_name.clone(),
            share_name: self.share_name.clone(),
            user_id: self.user_id.clone(),
            password: self.password.clone(),
        }
    }

    /// Whether the location has been synced at least once.
    pub fn has_synced(&self) -> bool {
        self.last_sync.is_some()
    }
}

impl std::fmt::Debug for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Location")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("server_name", &self.server_name)
            .field("share_name", &self.share_name)
            .field("user_id", &self.user_id)
            .field("last_sync", &self.last_sync)
            .field("last_sync_complete", &self.last_sync_complete)
            .field("root_node_id", &self.root_node_id)
            .finish()
    }
}

/// Data required to register a new location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocation {
    /// Unique display name.
    pub name: String,
    /// Unique server host name.
    pub server_name: String,
    /// Share name on the server.
    pub share_name: String,
    /// Account used to open sessions.
    pub user_id: String,
    /// Password for `user_id`.
    pub password: String,
}

impl CreateLocation {
    /// Reject blank fields.
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = [
            ("name", &self.name),
            ("server_name", &self.server_name),
            ("share_name", &self.share_name),
            ("user_id", &self.user_id),
            ("password", &self.password),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{field} must not be blank")));
            }
        }
        Ok(())
    }
}
