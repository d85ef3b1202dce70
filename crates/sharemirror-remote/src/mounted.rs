//! Connector for shares mounted on the local host.
//!
//! The share `\\<server>\<share>` is expected at `<mount_root>/<server>/<share>`.
//! Host names are still resolved so that an unknown server is reported as
//! unreachable the same way a network client would report it.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use sharemirror_core::traits::share::{
    ByteStream, RemoteEntry, RemoteError, ShareConnector, ShareCredentials, ShareSession,
};

use crate::path::components;

/// Connector for shares mounted under a common root directory.
#[derive(Debug, Clone)]
pub struct MountedShareConnector {
    /// Directory containing one subdirectory per server.
    mount_root: PathBuf,
    /// Port used for address resolution.
    port: u16,
}

impl MountedShareConnector {
    /// Create a connector rooted at `mount_root`.
    pub fn new(mount_root: impl Into<PathBuf>, port: u16) -> Self {
        Self {
            mount_root: mount_root.into(),
            port,
        }
    }
}

#[async_trait]
impl ShareConnector for MountedShareConnector {
    fn connector_type(&self) -> &str {
        "mounted"
    }

    async fn resolve_address(&self, hostname: &str) -> Result<IpAddr, RemoteError> {
        if let Ok(address) = hostname.parse::<IpAddr>() {
            return Ok(address);
        }

        let mut addresses = tokio::net::lookup_host((hostname, self.port))
            .await
            .map_err(|e| RemoteError::HostUnreachable(format!("{hostname}: {e}")))?;

        addresses
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| RemoteError::HostUnreachable(format!("{hostname}: no addresses")))
    }

    async fn connect(
        &self,
        credentials: &ShareCredentials,
        address: IpAddr,
        timeout: Duration,
    ) -> Result<Box<dyn ShareSession>, RemoteError> {
        let server_root = self.mount_root.join(&credentials.server_name);
        let share_root = server_root.join(&credentials.share_name);

        let metadata = tokio::time::timeout(timeout, fs::metadata(&share_root))
            .await
            .map_err(|_| RemoteError::Timeout {
                operation: "connect",
                elapsed: timeout,
            })?
            .map_err(|e| {
                RemoteError::ConnectFailure(format!("{}: {e}", share_root.display()))
            })?;

        if !metadata.is_dir() {
            return Err(RemoteError::ConnectFailure(format!(
                "{} is not a directory",
                share_root.display()
            )));
        }

        debug!(
            server = %credentials.server_name,
            share = %credentials.share_name,
            %address,
            "Opened mounted share session"
        );

        Ok(Box::new(MountedShareSession {
            server_root,
            closed: false,
        }))
    }
}

/// Session against one mounted server directory.
#[derive(Debug)]
struct MountedShareSession {
    server_root: PathBuf,
    closed: bool,
}

impl MountedShareSession {
    fn resolve(&self, share_name: &str, path: &str) -> Option<PathBuf> {
        let parts = components(path)?;
        let mut full = self.server_root.join(share_name);
        for part in parts {
            full.push(part);
        }
        Some(full)
    }
}

#[async_trait]
impl ShareSession for MountedShareSession {
    async fn list(
        &mut self,
        share_name: &str,
        dir_path: &str,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        let failure = |reason: String| RemoteError::ListFailure {
            path: dir_path.to_string(),
            reason,
        };

        if self.closed {
            return Err(failure("session closed".into()));
        }
        let dir = self
            .resolve(share_name, dir_path)
            .ok_or_else(|| failure("path escapes the share".into()))?;

        let mut reader = fs::read_dir(&dir).await.map_err(|e| failure(e.to_string()))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|e| failure(e.to_string()))? {
            let file_type = entry.file_type().await.map_err(|e| failure(e.to_string()))?;
            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory: file_type.is_dir(),
            });
        }
        Ok(entries)
    }

    async fn retrieve(
        &mut self,
        share_name: &str,
        file_path: &str,
    ) -> Result<ByteStream, RemoteError> {
        let failure = |reason: String| RemoteError::RetrieveFailure {
            path: file_path.to_string(),
            reason,
        };

        if self.closed {
            return Err(failure("session closed".into()));
        }
        let full_path = self
            .resolve(share_name, file_path)
            .ok_or_else(|| failure("path escapes the share".into()))?;

        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| failure(e.to_string()))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(|b| b.into()))))
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
