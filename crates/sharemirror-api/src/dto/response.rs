//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Jobs waiting on the worker, when it runs.
    pub pending_jobs: Option<usize>,
}

/// Live availability of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    /// Node identifier.
    pub node_id: Uuid,
    /// Whether the node's entry currently exists on the share.
    pub available: bool,
}

/// Acknowledgement of a job handed to the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    /// Job identifier.
    pub job_id: Uuid,
    /// Job type.
    pub job_type: String,
}
