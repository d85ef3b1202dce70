//! Request DTOs.

use serde::{Deserialize, Serialize};

use sharemirror_entity::location::CreateLocation;

/// Body of `POST /api/locations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocationRequest {
    /// Display name.
    pub name: String,
    /// Server host name.
    pub server_name: String,
    /// Share name.
    pub share_name: String,
    /// Account name.
    pub user_id: String,
    /// Account password.
    pub password: String,
}

impl From<CreateLocationRequest> for CreateLocation {
    fn from(req: CreateLocationRequest) -> Self {
        Self {
            name: req.name,
            server_name: req.server_name,
            share_name: req.share_name,
            user_id: req.user_id,
            password: req.password,
        }
    }
}

/// `?lazy=` on view endpoints. Views are lazy unless asked otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    /// Skip expanding folder children.
    pub lazy: Option<bool>,
}

impl ViewQuery {
    /// Effective laziness.
    pub fn lazy(&self) -> bool {
        self.lazy.unwrap_or(true)
    }
}

/// Query string of the sync endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncQuery {
    /// Node syncs only: reconcile direct children only (default true).
    pub lazy: Option<bool>,
    /// Enqueue the sync on the worker instead of running it inline.
    #[serde(default)]
    pub background: bool,
}
