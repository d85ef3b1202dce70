//! # sharemirror-database
//!
//! Persistence for locations and their mirrored trees: the store traits
//! the sync engine is written against, PostgreSQL repositories, and an
//! in-memory store with the same constraint semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{LocationStore, PathNodeStore};
