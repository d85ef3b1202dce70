//! Path node domain entities.

pub mod class;
pub mod model;

pub use class::{LeafKind, NodeClass};
pub use model::{CreatePathNode, PathNode};
