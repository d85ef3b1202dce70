//! Location lifecycle and top-level synchronization.

pub mod service;

pub use service::{LocationService, LocationStatus};
