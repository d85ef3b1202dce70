//! # sharemirror-service
//!
//! The synchronization engine. Services are built once with their
//! dependencies injected as `Arc` references and are cheap to clone.
//!
//! - [`RemoteGateway`] mediates every remote call and turns remote failures
//!   into `None`/`false`.
//! - [`TreeSyncer`] reconciles persisted nodes against live listings.
//! - [`AvailabilityProbe`] and [`ContentRetriever`] answer live questions
//!   about single nodes.
//! - [`ViewProjector`] renders nodes as browse trees.
//! - [`MirrorService`] is the invocation surface used by the API and worker.

pub mod location;
pub mod mirror;
pub mod remote;
pub mod tree;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use location::{LocationService, LocationStatus};
pub use mirror::MirrorService;
pub use remote::RemoteGateway;
pub use tree::{
    AvailabilityProbe, ContentRetriever, ListingCache, LocationLocks, NameMatcher,
    RetrievedContents, SyncReport, TreeSyncer,
};
pub use view::ViewProjector;
