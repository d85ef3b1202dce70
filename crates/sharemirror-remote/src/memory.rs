//! Scriptable in-memory share connector.
//!
//! Servers, shares, directories and files are registered up front; tests can
//! then take hosts offline, make individual directories fail to list, or
//! remove entries between syncs. Listings include the `.` and `..` pseudo
//! entries that SMB servers report, followed by entries in insertion order.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use sharemirror_core::traits::share::{
    ByteStream, RemoteEntry, RemoteError, ShareConnector, ShareCredentials, ShareSession,
};

use crate::path::normalize;

#[derive(Debug, Default)]
struct MemoryShare {
    /// Directory path to its entries, in insertion order.
    dirs: HashMap<String, Vec<RemoteEntry>>,
    files: HashMap<String, Bytes>,
    failing: HashSet<String>,
}

impl MemoryShare {
    fn new() -> Self {
        let mut share = Self::default();
        share.dirs.insert(".".to_string(), Vec::new());
        share
    }

    /// Insert `path` and any missing ancestors.
    fn insert(&mut self, path: &str, is_directory: bool) {
        let Some((parent, name)) = path.rsplit_once('/') else {
            return;
        };
        if !self.dirs.contains_key(parent) {
            self.insert(parent, true);
        }
        let siblings = self.dirs.entry(parent.to_string()).or_default();
        if !siblings.iter().any(|e| e.name == name) {
            siblings.push(RemoteEntry {
                name: name.to_string(),
                is_directory,
            });
        }
        if is_directory {
            self.dirs.entry(path.to_string()).or_default();
        }
    }

    /// Remove `path` and everything beneath it.
    fn remove(&mut self, path: &str) {
        if let Some((parent, name)) = path.rsplit_once('/') {
            if let Some(siblings) = self.dirs.get_mut(parent) {
                siblings.retain(|e| e.name != name);
            }
        }
        let prefix = format!("{path}/");
        self.dirs.retain(|p, _| p != path && !p.starts_with(&prefix));
        self.files.retain(|p, _| p != path && !p.starts_with(&prefix));
    }
}

#[derive(Debug)]
struct MemoryServer {
    address: IpAddr,
    reachable: bool,
    connect_delay: Duration,
    list_delay: Duration,
    retrieve_delay: Duration,
    shares: HashMap<String, MemoryShare>,
}

#[derive(Debug, Default)]
struct Inner {
    servers: RwLock<HashMap<String, MemoryServer>>,
    sessions_opened: AtomicUsize,
    sessions_open: AtomicUsize,
}

/// In-memory implementation of [`ShareConnector`].
#[derive(Debug, Clone, Default)]
pub struct MemoryShareConnector {
    inner: Arc<Inner>,
}

impl MemoryShareConnector {
    /// Create a connector with no servers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `share_name` on `server_name`, creating the server if needed.
    pub async fn add_share(&self, server_name: &str, share_name: &str) {
        let mut servers = self.inner.servers.write().await;
        let host_number = u32::try_from(servers.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        let server = servers
            .entry(server_name.to_string())
            .or_insert_with(|| MemoryServer {
                address: IpAddr::V4(Ipv4Addr::from(0x0A00_0000 | (host_number & 0x00FF_FFFF))),
                reachable: true,
                connect_delay: Duration::ZERO,
                list_delay: Duration::ZERO,
                retrieve_delay: Duration::ZERO,
                shares: HashMap::new(),
            });
        server
            .shares
            .entry(share_name.to_string())
            .or_insert_with(MemoryShare::new);
    }

    /// Add a directory (and its missing ancestors).
    pub async fn add_directory(&self, server_name: &str, share_name: &str, path: &str) {
        self.with_share(server_name, share_name, path, |share, path| {
            share.insert(path, true)
        })
        .await;
    }

    /// Add a file with `contents` (and its missing ancestor directories).
    pub async fn add_file(
        &self,
        server_name: &str,
        share_name: &str,
        path: &str,
        contents: impl Into<Bytes>,
    ) {
        let contents = contents.into();
        self.with_share(server_name, share_name, path, move |share, path| {
            share.insert(path, false);
            share.files.insert(path.to_string(), contents);
        })
        .await;
    }

    /// Remove an entry and its subtree from the share.
    pub async fn remove(&self, server_name: &str, share_name: &str, path: &str) {
        self.with_share(server_name, share_name, path, |share, path| share.remove(path))
            .await;
    }

    /// Make listing `dir_path` fail (or succeed again).
    pub async fn set_list_failure(
        &self,
        server_name: &str,
        share_name: &str,
        dir_path: &str,
        failing: bool,
    ) {
        self.with_share(server_name, share_name, dir_path, move |share, path| {
            if failing {
                share.failing.insert(path.to_string());
            } else {
                share.failing.remove(path);
            }
        })
        .await;
    }

    /// Take a server off the network or bring it back.
    pub async fn set_reachable(&self, server_name: &str, reachable: bool) {
        if let Some(server) = self.inner.servers.write().await.get_mut(server_name) {
            server.reachable = reachable;
        }
    }

    /// Delay session setup on a server.
    pub async fn set_connect_delay(&self, server_name: &str, delay: Duration) {
        if let Some(server) = self.inner.servers.write().await.get_mut(server_name) {
            server.connect_delay = delay;
        }
    }

    /// Delay every directory listing on a server.
    pub async fn set_list_delay(&self, server_name: &str, delay: Duration) {
        if let Some(server) = self.inner.servers.write().await.get_mut(server_name) {
            server.list_delay = delay;
        }
    }

    /// Delay every file retrieval on a server.
    pub async fn set_retrieve_delay(&self, server_name: &str, delay: Duration) {
        if let Some(server) = self.inner.servers.write().await.get_mut(server_name) {
            server.retrieve_delay = delay;
        }
    }

    /// Number of sessions opened so far.
    pub fn sessions_opened(&self) -> usize {
        self.inner.sessions_opened.load(Ordering::SeqCst)
    }

    /// Number of sessions opened and not yet closed.
    pub fn sessions_open(&self) -> usize {
        self.inner.sessions_open.load(Ordering::SeqCst)
    }

    async fn with_share<F>(&self, server_name: &str, share_name: &str, path: &str, f: F)
    where
        F: FnOnce(&mut MemoryShare, &str),
    {
        let Some(path) = normalize(path) else {
            return;
        };
        self.add_share(server_name, share_name).await;
        let mut servers = self.inner.servers.write().await;
        if let Some(share) = servers
            .get_mut(server_name)
            .and_then(|s| s.shares.get_mut(share_name))
        {
            f(share, &path);
        }
    }
}

#[async_trait]
impl ShareConnector for MemoryShareConnector {
    fn connector_type(&self) -> &str {
        "memory"
    }

    async fn resolve_address(&self, hostname: &str) -> Result<IpAddr, RemoteError> {
        let servers = self.inner.servers.read().await;
        match servers.get(hostname) {
            Some(server) if server.reachable => Ok(server.address),
            Some(_) => Err(RemoteError::HostUnreachable(format!("{hostname}: offline"))),
            None => Err(RemoteError::HostUnreachable(format!(
                "{hostname}: unknown host"
            ))),
        }
    }

    async fn connect(
        &self,
        credentials: &ShareCredentials,
        address: IpAddr,
        timeout: Duration,
    ) -> Result<Box<dyn ShareSession>, RemoteError> {
        let delay = {
            let servers = self.inner.servers.read().await;
            let server = servers
                .get(&credentials.server_name)
                .filter(|s| s.reachable && s.address == address)
                .ok_or_else(|| {
                    RemoteError::ConnectFailure(format!(
                        "no server '{}' at {address}",
                        credentials.server_name
                    ))
                })?;
            if !server.shares.contains_key(&credentials.share_name) {
                return Err(RemoteError::ConnectFailure(format!(
                    "no share '{}' on '{}'",
                    credentials.share_name, credentials.server_name
                )));
            }
            server.connect_delay
        };

        if delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(RemoteError::Timeout {
                operation: "connect",
                elapsed: timeout,
            });
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.inner.sessions_opened.fetch_add(1, Ordering::SeqCst);
        self.inner.sessions_open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryShareSession {
            inner: Arc::clone(&self.inner),
            server_name: credentials.server_name.clone(),
            closed: false,
        }))
    }
}

#[derive(Debug)]
struct MemoryShareSession {
    inner: Arc<Inner>,
    server_name: String,
    closed: bool,
}

impl MemoryShareSession {
    /// Sleep for the server's scripted delay, read without holding the lock.
    async fn stall(&self, pick: fn(&MemoryServer) -> Duration) {
        let delay = self
            .inner
            .servers
            .read()
            .await
            .get(&self.server_name)
            .map(pick)
            .unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ShareSession for MemoryShareSession {
    async fn list(
        &mut self,
        share_name: &str,
        dir_path: &str,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        let failure = |reason: &str| RemoteError::ListFailure {
            path: dir_path.to_string(),
            reason: reason.to_string(),
        };
        if self.closed {
            return Err(failure("session closed"));
        }
        let path = normalize(dir_path).ok_or_else(|| failure("path escapes the share"))?;
        self.stall(|s| s.list_delay).await;

        let servers = self.inner.servers.read().await;
        let server = servers
            .get(&self.server_name)
            .filter(|s| s.reachable)
            .ok_or_else(|| failure("connection lost"))?;
        let share = server
            .shares
            .get(share_name)
            .ok_or_else(|| failure("no such share"))?;
        if share.failing.contains(&path) {
            return Err(failure("access denied"));
        }
        let entries = share.dirs.get(&path).ok_or_else(|| failure("no such directory"))?;

        let mut listing = vec![RemoteEntry::directory("."), RemoteEntry::directory("..")];
        listing.extend(entries.iter().cloned());
        Ok(listing)
    }

    async fn retrieve(
        &mut self,
        share_name: &str,
        file_path: &str,
    ) -> Result<ByteStream, RemoteError> {
        let failure = |reason: &str| RemoteError::RetrieveFailure {
            path: file_path.to_string(),
            reason: reason.to_string(),
        };
        if self.closed {
            return Err(failure("session closed"));
        }
        let path = normalize(file_path).ok_or_else(|| failure("path escapes the share"))?;
        self.stall(|s| s.retrieve_delay).await;

        let servers = self.inner.servers.read().await;
        let contents = servers
            .get(&self.server_name)
            .filter(|s| s.reachable)
            .and_then(|s| s.shares.get(share_name))
            .and_then(|share| share.files.get(&path))
            .cloned()
            .ok_or_else(|| failure("no such file"))?;

        Ok(Box::pin(futures::stream::iter(vec![Ok(contents)])))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.inner.sessions_open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
