//! # sharemirror-remote
//!
//! Implementations of [`sharemirror_core::traits::share::ShareConnector`].
//!
//! - [`MountedShareConnector`] reaches shares the host has mounted under a
//!   common root, one directory per `<server>/<share>`.
//! - [`MemoryShareConnector`] is a scriptable share used in tests and
//!   local development.

pub mod memory;
pub mod mounted;
mod path;

pub use memory::MemoryShareConnector;
pub use mounted::MountedShareConnector;
