//! Per-location mutual exclusion for tree mutations.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Serializes syncs that touch the same location's tree.
///
/// Read-then-create of children is not atomic, so two syncs over one
/// location must not interleave. Different locations proceed in parallel.
#[derive(Debug, Clone, Default)]
pub struct LocationLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LocationLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `location_id`'s tree.
    pub async fn acquire(&self, location_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(location_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted location.
    pub fn forget(&self, location_id: Uuid) {
        self.locks.remove(&location_id);
    }
}
