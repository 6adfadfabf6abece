//! Connection management
//!
//! Channel-backed connections and the registry of attached connections.

mod connection;
mod registry;

pub use connection::ChannelConnection;
pub use registry::ConnectionRegistry;
