//! Live existence checks for single nodes.

use std::collections::HashMap;
use std::sync::Arc;

use sharemirror_core::traits::share::RemoteEntry;
use sharemirror_entity::location::Location;
use sharemirror_entity::path_node::PathNode;

use super::names::NameMatcher;
use crate::remote::RemoteGateway;

/// Parent directory listings gathered during one projection.
///
/// A failed listing is cached too, so an unreachable share is probed once
/// per directory rather than once per node.
#[derive(Debug, Default)]
pub struct ListingCache {
    listings: HashMap<String, Option<Vec<RemoteEntry>>>,
}

impl ListingCache {
    /// Number of directories listed so far.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether nothing has been listed yet.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Answers "does this node still exist on the share".
#[derive(Debug, Clone)]
pub struct AvailabilityProbe {
    gateway: Arc<RemoteGateway>,
    names: NameMatcher,
}

impl AvailabilityProbe {
    /// Creates a new probe.
    pub fn new(gateway: Arc<RemoteGateway>, names: NameMatcher) -> Self {
        Self { gateway, names }
    }

    /// Re-list the node's parent directory and look for its name.
    ///
    /// The root is always available. A failed listing reports `false`:
    /// unreachable and gone are not told apart.
    pub async fn is_available(&self, location: &Location, node: &PathNode) -> bool {
        if node.is_root() {
            return true;
        }
        let listing = self
            .gateway
            .list_directory(location, node.location_path())
            .await;
        self.contains(listing.as_deref(), node)
    }

    /// Same as [`Self::is_available`], reusing listings held in `cache`.
    pub async fn is_available_cached(
        &self,
        location: &Location,
        node: &PathNode,
        cache: &mut ListingCache,
    ) -> bool {
        if node.is_root() {
            return true;
        }
        let dir = node.location_path();
        if !cache.listings.contains_key(dir) {
            let listing = self.gateway.list_directory(location, dir).await;
            cache.listings.insert(dir.to_string(), listing);
        }
        let listing = cache.listings.get(dir).and_then(|l| l.as_deref());
        self.contains(listing, node)
    }

    fn contains(&self, listing: Option<&[RemoteEntry]>, node: &PathNode) -> bool {
        listing.is_some_and(|entries| {
            entries
                .iter()
                .any(|entry| self.names.matches(&entry.name, &node.name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, SERVER, SHARE};
    use sharemirror_database::store::PathNodeStore;

    #[tokio::test]
    async fn test_root_is_always_available() {
        let fx = Fixture::new().await;
        fx.remote.set_reachable(SERVER, false).await;
        let root = fx.root().await;
        assert!(fx.probe.is_available(&fx.location, &root).await);
    }

    #[tokio::test]
    async fn test_present_then_removed() {
        let fx = Fixture::new().await;
        fx.remote.add_file(SERVER, SHARE, "./reports/a.dcm", &b"a"[..]).await;
        let root = fx.root().await;
        fx.syncer.sync(&fx.location, &root, false).await.unwrap();

        let reports = fx.store.find_child(root.id, "reports").await.unwrap().unwrap();
        let scan = fx.store.find_child(reports.id, "a.dcm").await.unwrap().unwrap();
        assert!(fx.probe.is_available(&fx.location, &reports).await);
        assert!(fx.probe.is_available(&fx.location, &scan).await);

        fx.remote.remove(SERVER, SHARE, "./reports/a.dcm").await;
        assert!(!fx.probe.is_available(&fx.location, &scan).await);
        assert!(fx.probe.is_available(&fx.location, &reports).await);
    }

    #[tokio::test]
    async fn test_failed_parent_listing_is_unavailable() {
        let fx = Fixture::new().await;
        fx.remote.add_file(SERVER, SHARE, "./reports/a.dcm", &b"a"[..]).await;
        let root = fx.root().await;
        fx.syncer.sync(&fx.location, &root, false).await.unwrap();
        let reports = fx.store.find_child(root.id, "reports").await.unwrap().unwrap();
        let scan = fx.store.find_child(reports.id, "a.dcm").await.unwrap().unwrap();

        fx.remote.set_list_failure(SERVER, SHARE, "./reports", true).await;
        assert!(!fx.probe.is_available(&fx.location, &scan).await);

        fx.remote.set_list_failure(SERVER, SHARE, "./reports", false).await;
        fx.remote.set_reachable(SERVER, false).await;
        assert!(!fx.probe.is_available(&fx.location, &scan).await);
    }

    #[tokio::test]
    async fn test_cache_lists_each_directory_once() {
        let fx = Fixture::new().await;
        fx.remote.add_file(SERVER, SHARE, "./a.dcm", &b"a"[..]).await;
        fx.remote.add_file(SERVER, SHARE, "./b.dcm", &b"b"[..]).await;
        let root = fx.root().await;
        fx.syncer.sync(&fx.location, &root, false).await.unwrap();
        let children = fx.store.find_children(root.id).await.unwrap();

        let opened = fx.remote.sessions_opened();
        let mut cache = ListingCache::default();
        for child in &children {
            assert!(
                fx.probe
                    .is_available_cached(&fx.location, child, &mut cache)
                    .await
            );
        }
        assert_eq!(cache.len(), 1);
        assert_eq!(fx.remote.sessions_opened(), opened + 1);
    }
}
