//! Built-in job handler implementations.

pub mod sync;

use std::sync::Arc;

use sharemirror_service::MirrorService;

use crate::executor::JobExecutor;
use crate::queue::JobQueue;

pub use sync::{SyncAllLocationsJobHandler, SyncLocationJobHandler, SyncNodeJobHandler};

/// Executor with every sync handler registered.
pub fn sync_executor(mirror: Arc<MirrorService>, queue: Arc<JobQueue>) -> JobExecutor {
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(SyncLocationJobHandler::new(Arc::clone(&mirror))));
    executor.register(Arc::new(SyncNodeJobHandler::new(Arc::clone(&mirror))));
    executor.register(Arc::new(SyncAllLocationsJobHandler::new(mirror, queue)));
    executor
}
