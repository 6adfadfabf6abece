//! Capability traits (ports) implemented by the lifetime and transport layers

mod connection;
mod lifetime_manager;

pub use connection::{HubConnection, SharedConnection};
pub use lifetime_manager::HubLifetimeManager;
