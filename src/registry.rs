//! Live observer registry
//!
//! The only shared mutable state in the service. Connection lifecycle
//! events mutate it while the producer and injector read point-in-time
//! snapshots; a snapshot is a copy and never sees later mutations.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::{Connection, ConnectionId};

/// De-duplicated set of currently live observers.
///
/// Cheap to clone — clones share the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<Vec<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live connection. Idempotent by identifier.
    pub fn register(&self, connection: Connection) {
        let mut live = self.inner.write();
        if live.iter().any(|c| c.id() == connection.id()) {
            return;
        }
        live.push(connection);
    }

    /// Remove a connection if present. Unregistering an absent id is not
    /// an error.
    pub fn unregister(&self, id: ConnectionId) {
        self.inner.write().retain(|c| c.id() != id);
    }

    /// Point-in-time copy of the live set, safe to iterate while
    /// concurrent register/unregister calls proceed.
    pub fn snapshot(&self) -> Vec<Connection> {
        self.inner.read().clone()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.inner.read().iter().any(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
