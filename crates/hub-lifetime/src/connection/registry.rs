//! Connection registry
//!
//! Tracks attached connections using DashMap for thread-safe access.

use dashmap::DashMap;
use hub_core::{ConnectionId, SharedConnection};
use std::sync::Arc;

/// Concurrent map of connection ID to attached connection
///
/// Presence in the map means "currently attached". Registering an ID that is
/// already present replaces the previous entry.
pub struct ConnectionRegistry {
    /// Attached connections by ID
    connections: DashMap<ConnectionId, SharedConnection>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create an empty registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection under its own ID (last write wins)
    pub fn register(&self, connection: SharedConnection) {
        let connection_id = connection.connection_id().clone();
        let replaced = self
            .connections
            .insert(connection_id.clone(), connection)
            .is_some();

        tracing::debug!(
            connection_id = %connection_id,
            replaced = replaced,
            "Connection registered"
        );
    }

    /// Remove a connection; returns whether it was present
    pub fn unregister(&self, connection_id: &str) -> bool {
        let removed = self.connections.remove(connection_id).is_some();

        if removed {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }

        removed
    }

    /// Point lookup
    pub fn lookup(&self, connection_id: &str) -> Option<SharedConnection> {
        self.connections.get(connection_id).map(|r| Arc::clone(r.value()))
    }

    /// Check if a connection is attached
    pub fn contains(&self, connection_id: &str) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Collect the currently attached connections
    ///
    /// Shard locks are released before this returns, so callers may send to
    /// the result or re-enter the registry freely.
    pub fn snapshot(&self) -> Vec<SharedConnection> {
        self.connections.iter().map(|r| Arc::clone(r.value())).collect()
    }

    /// Call `f` once per attached connection, in unspecified order
    ///
    /// Traversal runs over a snapshot: connections registered or removed while
    /// it runs may or may not be visited.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&SharedConnection),
    {
        for connection in self.snapshot() {
            f(&connection);
        }
    }

    /// Get all attached connection IDs
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(|r| r.key().clone()).collect()
    }

    /// Get the number of attached connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Check whether no connection is attached
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Unregister connections whose peer has gone away; returns the removed connections
    pub fn remove_closed(&self) -> Vec<SharedConnection> {
        let closed: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|r| r.value().is_closed())
            .map(|r| r.key().clone())
            .collect();

        // Re-check under the shard lock: the ID may have been re-registered
        // with a live connection since the scan.
        let removed: Vec<SharedConnection> = closed
            .into_iter()
            .filter_map(|id| {
                self.connections
                    .remove_if(id.as_str(), |_, conn| conn.is_closed())
                    .map(|(_, conn)| conn)
            })
            .collect();

        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "Removed closed connections");
        }

        removed
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .finish()
    }
}
