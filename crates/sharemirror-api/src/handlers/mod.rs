//! Request handlers, one module per resource.

pub mod health;
pub mod location;
pub mod node;

use sharemirror_core::error::AppError;
use sharemirror_worker::{JobKind, JobQueue};

use crate::dto::response::JobAccepted;
use crate::state::AppState;

/// Hand a job to the worker queue.
pub(crate) fn enqueue(state: &AppState, kind: JobKind) -> Result<JobAccepted, AppError> {
    let queue: &JobQueue = state
        .jobs
        .as_deref()
        .ok_or_else(|| AppError::service_unavailable("Background worker is disabled"))?;
    let job = queue.enqueue(kind)?;
    Ok(JobAccepted {
        job_id: job.id,
        job_type: job.job_type().to_string(),
    })
}
