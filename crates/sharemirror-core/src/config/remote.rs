//! Remote share access configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every remote share operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Session establishment timeout in milliseconds. Kept short because
    /// availability probes run on interactive browse paths.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Upper bound for a single directory listing.
    #[serde(default = "default_list_timeout")]
    pub list_timeout_seconds: u64,
    /// Upper bound for copying one file out of the share.
    #[serde(default = "default_retrieve_timeout")]
    pub retrieve_timeout_seconds: u64,
    /// Port used when resolving the server address.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory under which shares are mounted as `<server>/<share>`.
    #[serde(default = "default_mount_root")]
    pub mount_root: String,
    /// Compare remote entry names case-insensitively when matching
    /// persisted nodes.
    #[serde(default)]
    pub case_insensitive_names: bool,
}

impl RemoteConfig {
    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Listing timeout as a [`Duration`].
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_seconds)
    }

    /// Retrieval timeout as a [`Duration`].
    pub fn retrieve_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieve_timeout_seconds)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            list_timeout_seconds: default_list_timeout(),
            retrieve_timeout_seconds: default_retrieve_timeout(),
            port: default_port(),
            mount_root: default_mount_root(),
            case_insensitive_names: false,
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

fn default_list_timeout() -> u64 {
    30
}

fn default_retrieve_timeout() -> u64 {
    300
}

fn default_port() -> u16 {
    139
}

fn default_mount_root() -> String {
    "/mnt/shares".to_string()
}
