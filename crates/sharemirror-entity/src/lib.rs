//! # sharemirror-entity
//!
//! Domain entity models for ShareMirror. `Location` and `PathNode` are
//! database rows and derive `sqlx::FromRow`; the `view` module holds the
//! JSON tree fragment consumed by browsing clients.

pub mod location;
pub mod path_node;
pub mod view;
