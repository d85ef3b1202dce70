//! Core traits defined in `sharemirror-core` and implemented by other crates.

pub mod share;

pub use share::{ByteStream, RemoteEntry, RemoteError, ShareConnector, ShareCredentials, ShareSession};
