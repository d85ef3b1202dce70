//! Reconciles persisted nodes against live directory listings.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use sharemirror_core::result::AppResult;
use sharemirror_database::store::PathNodeStore;
use sharemirror_entity::location::Location;
use sharemirror_entity::path_node::{CreatePathNode, PathNode};

use super::names::NameMatcher;
use super::report::SyncReport;
use crate::remote::RemoteGateway;

/// Synchronizes a node, and optionally its whole subtree, with the share.
///
/// Nodes are only ever added. An entry that disappeared remotely keeps its
/// node; availability checks report it as gone.
#[derive(Debug, Clone)]
pub struct TreeSyncer {
    /// Node persistence.
    nodes: Arc<dyn PathNodeStore>,
    /// Remote access.
    gateway: Arc<RemoteGateway>,
    /// Entry/node name comparison.
    names: NameMatcher,
}

impl TreeSyncer {
    /// Creates a new tree syncer.
    pub fn new(
        nodes: Arc<dyn PathNodeStore>,
        gateway: Arc<RemoteGateway>,
        names: NameMatcher,
    ) -> Self {
        Self {
            nodes,
            gateway,
            names,
        }
    }

    /// Sync `node` against its remote directory.
    ///
    /// With `lazy` set only the node's direct children are reconciled.
    /// Otherwise every listed subdirectory is synced recursively, in listing
    /// order, and a branch that cannot be listed is recorded and skipped.
    /// Remote failures never produce an error; persistence failures do and
    /// abort the run.
    ///
    /// Callers must hold the location's lock.
    pub async fn sync(
        &self,
        location: &Location,
        node: &PathNode,
        lazy: bool,
    ) -> AppResult<SyncReport> {
        let mut report = SyncReport::begin(location.id, node.id, lazy);
        report.root_listed = self.sync_level(location, node, lazy, &mut report).await?;
        let report = report.finish();

        info!(
            location_id = %location.id,
            node_id = %node.id,
            path = %node.full_path(),
            lazy,
            listed = report.directories_listed,
            created = report.nodes_created,
            reused = report.nodes_reused,
            failed = report.failed_paths.len(),
            duration_ms = report.duration_ms(),
            "Sync finished"
        );
        Ok(report)
    }

    fn sync_level<'a>(
        &'a self,
        location: &'a Location,
        node: &'a PathNode,
        lazy: bool,
        report: &'a mut SyncReport,
    ) -> BoxFuture<'a, AppResult<bool>> {
        async move {
            let path = node.full_path();
            let Some(entries) = self.gateway.list_directory(location, path).await else {
                report.failed_paths.push(path.to_string());
                return Ok(false);
            };
            report.directories_listed += 1;

            let mut children: HashMap<String, PathNode> = self
                .nodes
                .find_children(node.id)
                .await?
                .into_iter()
                .map(|child| (self.names.key(&child.name), child))
                .collect();

            for entry in entries {
                let key = self.names.key(&entry.name);
                let child = match children.get(&key) {
                    Some(existing) => {
                        report.nodes_reused += 1;
                        existing.clone()
                    }
                    None => {
                        let created = self.create_child(node, &entry.name, report).await?;
                        children.insert(key, created.clone());
                        created
                    }
                };

                if entry.is_directory && !lazy {
                    self.sync_level(location, &child, false, report).await?;
                }
            }

            Ok(true)
        }
        .boxed()
    }

    /// Persist a child, reusing the winner if a concurrent insert got there first.
    async fn create_child(
        &self,
        parent: &PathNode,
        name: &str,
        report: &mut SyncReport,
    ) -> AppResult<PathNode> {
        match self.nodes.create(&CreatePathNode::child_of(parent, name)).await {
            Ok(child) => {
                debug!(node_id = %child.id, path = %child.path, "Created node");
                report.nodes_created += 1;
                Ok(child)
            }
            Err(e) if e.is_conflict() => {
                warn!(parent_id = %parent.id, name, "Child created concurrently, reusing it");
                match self.nodes.find_child(parent.id, name).await? {
                    Some(existing) => {
                        report.nodes_reused += 1;
                        Ok(existing)
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }
}
