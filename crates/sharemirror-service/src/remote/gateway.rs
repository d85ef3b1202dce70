//! Every remote call made on behalf of a location goes through here.
//!
//! Remote failures never escape this module: they are logged and reported
//! as `None` or `false`. Each operation opens its own session and closes it
//! before returning, whatever the outcome.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use sharemirror_core::config::RemoteConfig;
use sharemirror_core::error::{AppError, ErrorKind};
use sharemirror_core::result::AppResult;
use sharemirror_core::traits::share::{RemoteEntry, RemoteError, ShareConnector, ShareSession};
use sharemirror_entity::location::Location;

/// Run `fut`, giving up after `limit`.
async fn bounded<T, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(RemoteError::Timeout {
            operation,
            elapsed: limit,
        }))
}

/// Mediates connection, listing and retrieval for locations.
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    /// Connector used to reach shares.
    connector: Arc<dyn ShareConnector>,
    /// Timeouts.
    config: RemoteConfig,
}

impl RemoteGateway {
    /// Creates a new gateway.
    pub fn new(connector: Arc<dyn ShareConnector>, config: RemoteConfig) -> Self {
        Self { connector, config }
    }

    /// Open a session to the location's share.
    ///
    /// Name resolution and session setup share the connect timeout. Returns
    /// `None` when the host is unreachable or refuses the session.
    pub async fn connect(&self, location: &Location) -> Option<Box<dyn ShareSession>> {
        let credentials = location.credentials();
        let limit = self.config.connect_timeout();
        let attempt = async {
            let address = self
                .connector
                .resolve_address(&location.server_name)
                .await?;
            self.connector.connect(&credentials, address, limit).await
        };

        match bounded("connect", limit, attempt).await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(
                    location_id = %location.id,
                    server = %location.server_name,
                    share = %location.share_name,
                    error = %e,
                    "Remote share unreachable"
                );
                None
            }
        }
    }

    /// Probe the share by opening and immediately closing a session.
    pub async fn is_connected(&self, location: &Location) -> bool {
        match self.connect(location).await {
            Some(mut session) => {
                session.close().await;
                true
            }
            None => false,
        }
    }

    /// List the immediate entries of `path`, without `.` and `..`.
    ///
    /// `None` means the share or directory could not be listed, which is
    /// distinct from an empty directory.
    pub async fn list_directory(&self, location: &Location, path: &str) -> Option<Vec<RemoteEntry>> {
        let mut session = self.connect(location).await?;
        let result = self.list_with(&mut *session, location, path).await;
        session.close().await;
        result
    }

    /// Every file path below the share root, depth first in listing order.
    ///
    /// Uses a single session. `None` if the root itself cannot be listed;
    /// unreadable subdirectories are skipped.
    pub async fn list_all_files(&self, location: &Location) -> Option<Vec<String>> {
        let mut session = self.connect(location).await?;

        let mut files = Vec::new();
        let mut pending = vec![".".to_string()];
        let mut root_listed = false;

        while let Some(dir) = pending.pop() {
            let Some(entries) = self.list_with(&mut *session, location, &dir).await else {
                if dir == "." {
                    break;
                }
                continue;
            };
            if dir == "." {
                root_listed = true;
            }

            let mut subdirs = Vec::new();
            for entry in entries {
                let path = format!("{dir}/{}", entry.name);
                if entry.is_directory {
                    subdirs.push(path);
                } else {
                    files.push(path);
                }
            }
            pending.extend(subdirs.into_iter().rev());
        }

        session.close().await;
        root_listed.then_some(files)
    }

    /// Copy the remote file at `path` into `dest`, returning the byte count.
    ///
    /// Returns `Ok(None)` when the file could not be read from the share.
    /// Local write failures are errors.
    pub async fn copy_file(
        &self,
        location: &Location,
        path: &str,
        dest: &mut tokio::fs::File,
    ) -> AppResult<Option<u64>> {
        let Some(mut session) = self.connect(location).await else {
            return Ok(None);
        };

        let limit = self.config.retrieve_timeout();
        let copied = tokio::time::timeout(
            limit,
            Self::stream_into(&mut *session, &location.share_name, path, dest),
        )
        .await
        .unwrap_or(Ok(Err(RemoteError::Timeout {
            operation: "retrieve",
            elapsed: limit,
        })));
        session.close().await;

        match copied? {
            Ok(bytes) => {
                debug!(location_id = %location.id, path, bytes, "Retrieved remote file");
                Ok(Some(bytes))
            }
            Err(e) => {
                warn!(location_id = %location.id, path, error = %e, "Remote retrieval failed");
                Ok(None)
            }
        }
    }

    async fn list_with(
        &self,
        session: &mut dyn ShareSession,
        location: &Location,
        path: &str,
    ) -> Option<Vec<RemoteEntry>> {
        let listed = bounded(
            "list",
            self.config.list_timeout(),
            session.list(&location.share_name, path),
        )
        .await;

        match listed {
            Ok(entries) => Some(entries.into_iter().filter(|e| !e.is_pseudo()).collect()),
            Err(e) => {
                warn!(location_id = %location.id, path, error = %e, "Remote listing failed");
                None
            }
        }
    }

    /// Outer result is local I/O, inner result is the remote side.
    async fn stream_into(
        session: &mut dyn ShareSession,
        share_name: &str,
        path: &str,
        dest: &mut tokio::fs::File,
    ) -> AppResult<Result<u64, RemoteError>> {
        let mut stream = match session.retrieve(share_name, path).await {
            Ok(stream) => stream,
            Err(e) => return Ok(Err(e)),
        };

        let mut total = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    return Ok(Err(RemoteError::RetrieveFailure {
                        path: path.to_string(),
                        reason: e.to_string(),
                    }));
                }
            };
            dest.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write retrieved chunk", e)
            })?;
            total += chunk.len() as u64;
        }

        dest.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush contents", e))?;
        Ok(Ok(total))
    }
}
