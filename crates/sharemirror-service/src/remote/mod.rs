//! Remote share access for locations.

pub mod gateway;

pub use gateway::RemoteGateway;
