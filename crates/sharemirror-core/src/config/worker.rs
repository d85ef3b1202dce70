//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background sync worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrent job processing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Cron expression (with seconds) for the periodic full sync.
    #[serde(default = "default_sync_schedule")]
    pub sync_schedule: String,
    /// Attempts before a transiently failing job is dropped.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay before a failed job is retried, multiplied by the attempt count.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: default_concurrency(),
            sync_schedule: default_sync_schedule(),
            max_attempts: default_max_attempts(),
            retry_delay_seconds: default_retry_delay(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    2
}

fn default_sync_schedule() -> String {
    "0 0 * * * *".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    30
}
