//! # sharemirror-core
//!
//! Core crate for ShareMirror. Contains the unified error system,
//! configuration schemas, and the contract every remote share
//! connection provider implements.
//!
//! This crate has **no** internal dependencies on other ShareMirror crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
