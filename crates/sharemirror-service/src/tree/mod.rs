//! Tree synchronization and live node queries.

pub mod availability;
pub mod contents;
pub mod lock;
pub mod names;
pub mod report;
pub mod sync;

pub use availability::{AvailabilityProbe, ListingCache};
pub use contents::{ContentRetriever, RetrievedContents};
pub use lock::LocationLocks;
pub use names::NameMatcher;
pub use report::SyncReport;
pub use sync::TreeSyncer;
