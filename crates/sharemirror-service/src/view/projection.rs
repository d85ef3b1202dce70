//! Renders persisted nodes as browse trees.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use sharemirror_core::result::AppResult;
use sharemirror_database::store::PathNodeStore;
use sharemirror_entity::location::Location;
use sharemirror_entity::path_node::{NodeClass, PathNode};
use sharemirror_entity::view::{ViewChildren, ViewNode};

use crate::tree::{AvailabilityProbe, ListingCache};

/// Projects nodes into [`ViewNode`] fragments.
///
/// Read-only. Every leaf visited costs a live availability check; within
/// one projection each parent directory is listed at most once.
#[derive(Debug, Clone)]
pub struct ViewProjector {
    nodes: Arc<dyn PathNodeStore>,
    probe: Arc<AvailabilityProbe>,
}

impl ViewProjector {
    /// Creates a new projector.
    pub fn new(nodes: Arc<dyn PathNodeStore>, probe: Arc<AvailabilityProbe>) -> Self {
        Self { nodes, probe }
    }

    /// Project `node`. With `lazy` unset, folder children are expanded
    /// recursively in name order.
    pub async fn project(
        &self,
        location: &Location,
        node: &PathNode,
        lazy: bool,
    ) -> AppResult<ViewNode> {
        let mut cache = ListingCache::default();
        self.project_node(location, node, lazy, &mut cache).await
    }

    fn project_node<'a>(
        &'a self,
        location: &'a Location,
        node: &'a PathNode,
        lazy: bool,
        cache: &'a mut ListingCache,
    ) -> BoxFuture<'a, AppResult<ViewNode>> {
        async move {
            let text = if node.is_root() {
                location.name.clone()
            } else {
                node.name.clone()
            };

            let (icon, children) = match node.classification() {
                NodeClass::Leaf(kind) => {
                    let available = self
                        .probe
                        .is_available_cached(location, node, cache)
                        .await;
                    let icon = format!(
                        "{} {} {}",
                        kind.icon(),
                        if available { "available" } else { "unavailable" },
                        if node.is_imported { "imported" } else { "notimported" },
                    );
                    (icon, ViewChildren::Flag(false))
                }
                NodeClass::Folder => {
                    let children = if lazy {
                        ViewChildren::Flag(true)
                    } else {
                        let rows = self.nodes.find_children(node.id).await?;
                        if rows.is_empty() {
                            ViewChildren::Flag(true)
                        } else {
                            let mut views = Vec::with_capacity(rows.len());
                            for child in &rows {
                                views.push(self.project_node(location, child, false, cache).await?);
                            }
                            ViewChildren::Expanded(views)
                        }
                    };
                    (NodeClass::Folder.icon().to_string(), children)
                }
            };

            Ok(ViewNode {
                id: node.id.to_string(),
                text,
                children,
                icon,
            })
        }
        .boxed()
    }
}
