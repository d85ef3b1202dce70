//! Remote share contract.
//!
//! A [`ShareConnector`] opens sessions against one SMB/CIFS-like share;
//! a [`ShareSession`] lists directories and streams files relative to the
//! share root. Wire-level protocol handling lives entirely behind these
//! traits.

use std::net::IpAddr;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// One immediate entry of a remote directory.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RemoteEntry {
    /// Base name as reported by the server.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

impl RemoteEntry {
    /// A file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }

    /// A directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }

    /// Whether this is one of the `.`/`..` pseudo entries.
    pub fn is_pseudo(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// Who connects to which share.
#[derive(Clone)]
pub struct ShareCredentials {
    /// Server host name (resolved before connecting).
    pub server_name: String,
    /// Share name on that server.
    pub share_name: String,
    /// Account used to authenticate.
    pub user_id: String,
    /// Password for `user_id`.
    pub password: String,
}

impl std::fmt::Debug for ShareCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareCredentials")
            .field("server_name", &self.server_name)
            .field("share_name", &self.share_name)
            .field("user_id", &self.user_id)
            .field("password", &"****")
            .finish()
    }
}

/// Failure modes of the remote share.
///
/// None of these are fatal for the caller: the sync engine turns them into
/// "no connection" / "not available" outcomes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The server name does not resolve or no route exists.
    #[error("host unreachable: {0}")]
    HostUnreachable(String),
    /// The server refused or failed the session setup.
    #[error("connect failed: {0}")]
    ConnectFailure(String),
    /// The directory could not be listed (typically it no longer exists).
    #[error("listing '{path}' failed: {reason}")]
    ListFailure {
        /// Directory relative to the share root.
        path: String,
        /// Provider-specific reason.
        reason: String,
    },
    /// The file could not be read.
    #[error("retrieving '{path}' failed: {reason}")]
    RetrieveFailure {
        /// File relative to the share root.
        path: String,
        /// Provider-specific reason.
        reason: String,
    },
    /// An operation exceeded its configured timeout.
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// The timeout that elapsed.
        elapsed: Duration,
    },
}

/// Opens sessions to remote shares.
#[async_trait]
pub trait ShareConnector: Send + Sync + std::fmt::Debug + 'static {
    /// Return the connector type name (e.g., "mounted", "memory").
    fn connector_type(&self) -> &str;

    /// Resolve a server host name to an address.
    async fn resolve_address(&self, hostname: &str) -> Result<IpAddr, RemoteError>;

    /// Open a session to the share described by `credentials` at `address`.
    ///
    /// Implementations must give up after `timeout`.
    async fn connect(
        &self,
        credentials: &ShareCredentials,
        address: IpAddr,
        timeout: Duration,
    ) -> Result<Box<dyn ShareSession>, RemoteError>;
}

/// An open session to one share. Never shared between operations.
#[async_trait]
pub trait ShareSession: Send {
    /// List the immediate entries of `dir_path` on `share_name`.
    async fn list(&mut self, share_name: &str, dir_path: &str)
    -> Result<Vec<RemoteEntry>, RemoteError>;

    /// Stream the contents of `file_path` on `share_name`.
    async fn retrieve(&mut self, share_name: &str, file_path: &str)
    -> Result<ByteStream, RemoteError>;

    /// Close the session. Safe to call more than once and after failures.
    async fn close(&mut self);
}
