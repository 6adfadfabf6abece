//! In-process hub lifetime manager
//!
//! Composes the connection and group registries and implements
//! [`HubLifetimeManager`] for a single process.

use crate::broadcast::{fan_out, FanOutReport};
use crate::connection::{ChannelConnection, ConnectionRegistry};
use crate::groups::GroupRegistry;
use async_trait::async_trait;
use hub_common::{AppConfig, AppResult, GroupCleanup, LifetimeConfig};
use hub_core::{ConnectionId, HubLifetimeManager, Invocation, SharedConnection};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Single-process lifetime manager
///
/// Explicitly constructed and injected; independent instances share nothing.
pub struct DefaultHubLifetimeManager {
    /// Attached connections
    connections: Arc<ConnectionRegistry>,
    /// Group memberships
    groups: GroupRegistry,
    /// Lifetime configuration
    config: LifetimeConfig,
}

impl DefaultHubLifetimeManager {
    /// Create a manager with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LifetimeConfig::default())
    }

    /// Create a manager with custom configuration
    ///
    /// A zero `connection_buffer` is raised to 1, since a channel needs capacity.
    #[must_use]
    pub fn with_config(mut config: LifetimeConfig) -> Self {
        if config.connection_buffer == 0 {
            tracing::warn!("connection_buffer of 0 is not usable, using 1");
            config.connection_buffer = 1;
        }

        let connections = ConnectionRegistry::new_shared();
        let groups = GroupRegistry::new(Arc::clone(&connections));

        Self {
            connections,
            groups,
            config,
        }
    }

    /// Create a manager configured from the environment
    pub fn from_env() -> AppResult<Self> {
        let config = AppConfig::from_env()?;
        Ok(Self::with_config(config.lifetime))
    }

    /// Create a manager wrapped in Arc
    #[must_use]
    pub fn new_shared(config: LifetimeConfig) -> Arc<Self> {
        Arc::new(Self::with_config(config))
    }

    /// Get the lifetime configuration
    pub fn config(&self) -> &LifetimeConfig {
        &self.config
    }

    /// Create a channel-backed connection sized by configuration
    ///
    /// The connection is not attached; the transport calls `on_connected`
    /// once its handshake completes.
    pub fn create_connection(&self) -> (Arc<ChannelConnection>, mpsc::Receiver<Arc<Invocation>>) {
        ChannelConnection::channel(ConnectionId::generate(), self.config.connection_buffer)
    }

    /// Point lookup of an attached connection
    pub fn lookup(&self, connection_id: &str) -> Option<SharedConnection> {
        self.connections.lookup(connection_id)
    }

    /// Snapshot of a group's members
    pub fn members_of(&self, group_name: &str) -> Vec<SharedConnection> {
        self.groups.members_of(group_name)
    }

    /// Get the number of attached connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of groups (including empty ones)
    pub fn group_count(&self) -> usize {
        self.groups.group_count()
    }

    /// Get the connection registry
    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Get the group registry
    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// Send to every attached connection except the listed ones
    pub fn invoke_all_except(&self, target: &str, args: Vec<Value>, excluded: &[&str]) {
        let invocation = Arc::new(Invocation::new(target, args));
        let report = fan_out(self.connections.snapshot(), &invocation, excluded);
        log_report(&report, target, None);
    }

    /// Send to every member of a group except the listed ones
    pub fn invoke_group_except(
        &self,
        group_name: &str,
        target: &str,
        args: Vec<Value>,
        excluded: &[&str],
    ) {
        let invocation = Arc::new(Invocation::new(target, args));
        let report = fan_out(self.groups.members_of(group_name), &invocation, excluded);
        log_report(&report, target, Some(group_name));

        if self.config.group_cleanup == GroupCleanup::Lazy {
            for connection in &report.closed {
                self.groups.evict(group_name, connection);
            }
        }
    }

    /// Drop groups with no members
    pub fn prune_empty_groups(&self) -> usize {
        self.groups.prune_empty()
    }

    /// Detach connections whose peer is gone
    ///
    /// Group memberships follow the configured cleanup policy, as if
    /// `on_disconnected` had been called for each.
    pub fn remove_closed_connections(&self) -> usize {
        let removed = self.connections.remove_closed();

        if self.config.group_cleanup == GroupCleanup::OnDisconnect {
            for connection in &removed {
                self.groups.remove_connection(connection);
            }
        }

        removed.len()
    }
}

fn log_report(report: &FanOutReport, target: &str, group: Option<&str>) {
    tracing::trace!(
        target_method = %target,
        group = group.unwrap_or("*"),
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed(),
        "Invocation fanned out"
    );
}

#[async_trait]
impl HubLifetimeManager for DefaultHubLifetimeManager {
    async fn on_connected(&self, connection: SharedConnection) {
        self.connections.register(connection);
    }

    async fn on_disconnected(&self, connection: SharedConnection) {
        let connection_id = connection.connection_id();
        self.connections.unregister(connection_id.as_str());

        if self.config.group_cleanup == GroupCleanup::OnDisconnect {
            self.groups.remove_connection(&connection);
        }
    }

    async fn invoke_all(&self, target: &str, args: Vec<Value>) {
        self.invoke_all_except(target, args, &[]);
    }

    async fn invoke_client(&self, connection_id: &str, target: &str, args: Vec<Value>) {
        let Some(connection) = self.connections.lookup(connection_id) else {
            tracing::trace!(
                connection_id = %connection_id,
                target_method = %target,
                "Ignoring invocation for unknown connection"
            );
            return;
        };

        let invocation = Arc::new(Invocation::new(target, args));
        let report = fan_out([connection], &invocation, &[]);
        log_report(&report, target, None);
    }

    async fn invoke_group(&self, group_name: &str, target: &str, args: Vec<Value>) {
        self.invoke_group_except(group_name, target, args, &[]);
    }

    async fn add_to_group(&self, group_name: &str, connection_id: &str) {
        self.groups.add_to_group(group_name, connection_id);
    }

    async fn remove_from_group(&self, group_name: &str, connection_id: &str) {
        self.groups.remove_from_group(group_name, connection_id);
    }
}

impl Default for DefaultHubLifetimeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultHubLifetimeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultHubLifetimeManager")
            .field("connections", &self.connections)
            .field("groups", &self.groups)
            .field("config", &self.config)
            .finish()
    }
}
