//! Browse view shapes.

pub mod model;

pub use model::{ViewChildren, ViewNode};
