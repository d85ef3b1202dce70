//! Browse tree projection.

pub mod projection;

pub use projection::ViewProjector;
