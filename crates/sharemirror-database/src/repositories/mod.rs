//! PostgreSQL implementations of the store traits.

pub mod location;
pub mod path_node;

pub use location::LocationRepository;
pub use path_node::PathNodeRepository;
