//! A single named group
//!
//! Each group guards its member set with its own lock, so membership changes
//! and fan-out snapshots on the same group never race.

use hub_core::{ConnectionId, SharedConnection};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Named set of connections
pub struct Group {
    name: String,
    members: RwLock<HashMap<ConnectionId, SharedConnection>>,
}

impl Group {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or refresh a member; returns true if it was not already present
    pub fn insert(&self, connection: SharedConnection) -> bool {
        let connection_id = connection.connection_id().clone();
        self.members.write().insert(connection_id, connection).is_none()
    }

    /// Remove a member; returns whether it was present
    pub fn remove(&self, connection_id: &str) -> bool {
        self.members.write().remove(connection_id).is_some()
    }

    /// Remove a member only if it is still this exact connection
    ///
    /// A connection that re-registered under the same ID and re-joined is left alone.
    pub fn remove_if_same(&self, connection: &SharedConnection) -> bool {
        let mut members = self.members.write();
        let id = connection.connection_id();

        let same = members
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, connection));
        if same {
            members.remove(id);
        }
        same
    }

    /// Check membership
    pub fn contains(&self, connection_id: &str) -> bool {
        self.members.read().contains_key(connection_id)
    }

    /// Snapshot of current members
    pub fn members(&self) -> Vec<SharedConnection> {
        self.members.read().values().cloned().collect()
    }

    /// Snapshot of current member IDs
    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.read().keys().cloned().collect()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Check whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("members", &self.len())
            .finish()
    }
}
