//! Application state shared across all handlers.

use std::sync::Arc;

use sharemirror_service::MirrorService;
use sharemirror_worker::JobQueue;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sync engine facade.
    pub mirror: Arc<MirrorService>,
    /// Background job queue, absent when the worker is disabled.
    pub jobs: Option<Arc<JobQueue>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(mirror: Arc<MirrorService>, jobs: Option<Arc<JobQueue>>) -> Self {
        Self { mirror, jobs }
    }
}
