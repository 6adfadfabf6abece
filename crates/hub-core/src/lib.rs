//! # hub-core
//!
//! Domain layer for the hub: connection identity, invocations, and the
//! capability traits the lifetime core and transports meet at.
//! This crate has no dependency on any transport or runtime.

pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use error::DeliveryError;
pub use traits::{HubConnection, HubLifetimeManager, SharedConnection};
pub use value_objects::{ConnectionId, Invocation};
