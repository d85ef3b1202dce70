//! Background synchronization for ShareMirror.
//!
//! This crate provides:
//! - An in-process job queue carrying sync requests
//! - A job executor that dispatches jobs to the correct handler
//! - A worker runner that executes queued jobs with bounded concurrency
//! - A cron scheduler that enqueues the periodic full sync

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use queue::{Job, JobKind, JobQueue};
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
