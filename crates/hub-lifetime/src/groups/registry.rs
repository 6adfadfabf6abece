//! Group registry
//!
//! Maps group names to groups. Membership is resolved through the
//! [`ConnectionRegistry`]: only attached connections can join a group.

use super::Group;
use crate::connection::ConnectionRegistry;
use dashmap::DashMap;
use hub_core::{ConnectionId, SharedConnection};
use std::sync::Arc;

/// Concurrent map of group name to group
///
/// Lock order is always outer map shard, then group. Member inserts happen
/// while the shard guard is held, so [`GroupRegistry::prune_empty`] cannot drop
/// a group between its creation and the insert that justified it.
pub struct GroupRegistry {
    /// Registry used to resolve connection IDs
    connections: Arc<ConnectionRegistry>,

    /// Groups by name (created lazily, kept until pruned)
    groups: DashMap<String, Arc<Group>>,
}

impl GroupRegistry {
    /// Create an empty group registry over a connection registry
    #[must_use]
    pub fn new(connections: Arc<ConnectionRegistry>) -> Self {
        Self {
            connections,
            groups: DashMap::new(),
        }
    }

    /// Add an attached connection to a group
    ///
    /// Unknown connection IDs are ignored. Returns true if the connection
    /// became a member (false if unknown or already a member).
    pub fn add_to_group(&self, group_name: &str, connection_id: &str) -> bool {
        let Some(connection) = self.connections.lookup(connection_id) else {
            tracing::debug!(
                group = %group_name,
                connection_id = %connection_id,
                "Ignoring group add for unknown connection"
            );
            return false;
        };

        let added = if let Some(group) = self.groups.get(group_name) {
            group.insert(connection)
        } else {
            self.groups
                .entry(group_name.to_string())
                .or_insert_with(|| Arc::new(Group::new(group_name)))
                .insert(connection)
        };

        tracing::trace!(
            group = %group_name,
            connection_id = %connection_id,
            added = added,
            "Connection added to group"
        );

        added
    }

    /// Remove a connection from a group
    ///
    /// No-op if either is unknown. The group itself is kept even when empty.
    pub fn remove_from_group(&self, group_name: &str, connection_id: &str) -> bool {
        let removed = self
            .groups
            .get(group_name)
            .is_some_and(|group| group.remove(connection_id));

        if removed {
            tracing::trace!(
                group = %group_name,
                connection_id = %connection_id,
                "Connection removed from group"
            );
        }

        removed
    }

    /// Snapshot of a group's members; empty for an unknown group
    pub fn members_of(&self, group_name: &str) -> Vec<SharedConnection> {
        self.groups
            .get(group_name)
            .map(|group| group.members())
            .unwrap_or_default()
    }

    /// Check whether a connection is a member of a group
    pub fn contains_member(&self, group_name: &str, connection_id: &str) -> bool {
        self.groups
            .get(group_name)
            .is_some_and(|group| group.contains(connection_id))
    }

    /// Drop a specific stale member after a failed delivery
    pub fn evict(&self, group_name: &str, connection: &SharedConnection) -> bool {
        let evicted = self
            .groups
            .get(group_name)
            .is_some_and(|group| group.remove_if_same(connection));

        if evicted {
            tracing::debug!(
                group = %group_name,
                connection_id = %connection.connection_id(),
                "Evicted closed connection from group"
            );
        }

        evicted
    }

    /// Remove a connection from every group; returns how many groups it left
    ///
    /// Memberships held by a different connection under the same ID are kept.
    /// O(number of groups).
    pub fn remove_connection(&self, connection: &SharedConnection) -> usize {
        let left = self
            .groups
            .iter()
            .filter(|entry| entry.value().remove_if_same(connection))
            .count();

        if left > 0 {
            tracing::debug!(
                connection_id = %connection.connection_id(),
                groups = left,
                "Connection removed from all groups"
            );
        }

        left
    }

    /// Drop groups that currently have no members; returns how many were dropped
    pub fn prune_empty(&self) -> usize {
        let before = self.groups.len();
        self.groups.retain(|_, group| !group.is_empty());
        let pruned = before.saturating_sub(self.groups.len());

        if pruned > 0 {
            tracing::debug!(count = pruned, "Pruned empty groups");
        }

        pruned
    }

    /// Get the number of groups (including empty ones)
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Get all group names
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|r| r.key().clone()).collect()
    }

    /// Get member IDs of a group
    pub fn member_ids(&self, group_name: &str) -> Vec<ConnectionId> {
        self.groups
            .get(group_name)
            .map(|group| group.member_ids())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("groups", &self.groups.len())
            .finish()
    }
}
