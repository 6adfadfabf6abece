//! Lifetime management
//!
//! The hub-facing facade over the connection and group registries.

mod manager;

pub use manager::DefaultHubLifetimeManager;
