//! # hub-lifetime
//!
//! Connection lifetime and invocation fan-out for a real-time hub server.
//!
//! Tracks attached connections, maintains named groups over them, and
//! delivers invocations to one connection, a group, or everyone.

pub mod broadcast;
pub mod connection;
pub mod groups;
pub mod lifetime;

pub use broadcast::{fan_out, FanOutReport};
pub use connection::{ChannelConnection, ConnectionRegistry};
pub use groups::{Group, GroupRegistry};
pub use lifetime::DefaultHubLifetimeManager;
