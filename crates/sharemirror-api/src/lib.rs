//! # sharemirror-api
//!
//! HTTP API layer for ShareMirror built on Axum.
//!
//! Exposes location administration, sync triggers, browse views and
//! content download under `/api`. View endpoints return bare
//! [`sharemirror_entity::view::ViewNode`] trees; everything else uses the
//! `{ "success": true, "data": ... }` envelope.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
