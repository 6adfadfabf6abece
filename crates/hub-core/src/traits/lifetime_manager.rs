//! Lifetime manager capability (port)
//!
//! Callers (transport and hub dispatch) depend on this trait only, so an
//! in-process manager can be swapped for a multi-node backplane.

use async_trait::async_trait;
use serde_json::Value;

use super::SharedConnection;

/// Tracks attached connections and fans invocations out to them
///
/// No operation reports failure. Unknown connections and groups are no-ops,
/// and per-connection delivery failures stay inside the connection.
#[async_trait]
pub trait HubLifetimeManager: Send + Sync {
    /// Called once when a connection attaches
    async fn on_connected(&self, connection: SharedConnection);

    /// Called once when a connection detaches
    async fn on_disconnected(&self, connection: SharedConnection);

    /// Send an invocation to every attached connection
    async fn invoke_all(&self, target: &str, args: Vec<Value>);

    /// Send an invocation to a single connection
    async fn invoke_client(&self, connection_id: &str, target: &str, args: Vec<Value>);

    /// Send an invocation to every member of a group
    async fn invoke_group(&self, group_name: &str, target: &str, args: Vec<Value>);

    /// Add an attached connection to a group
    async fn add_to_group(&self, group_name: &str, connection_id: &str);

    /// Remove a connection from a group
    async fn remove_from_group(&self, group_name: &str, connection_id: &str);
}
