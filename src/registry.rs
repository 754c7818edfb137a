//! Registry definition
//!
//! The set of joined connections, bounded by a fixed capacity.

use std::collections::HashMap;

use crate::connection::Connection;
use crate::types::ConnectionId;

/// Live members of the chat
///
/// A connection is present iff it completed the handshake and has not
/// been torn down. Joining a full registry fails; established members
/// are never displaced.
#[derive(Debug)]
pub struct Registry {
    /// Members: ConnectionId -> Connection
    members: HashMap<ConnectionId, Connection>,
    /// Maximum number of members
    capacity: usize,
}

impl Registry {
    /// Create an empty registry holding at most `capacity` members
    pub fn new(capacity: usize) -> Self {
        Self {
            members: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a connection
    ///
    /// Returns false (and drops the handle) if the registry is full.
    pub fn join(&mut self, connection: Connection) -> bool {
        if self.is_full() {
            return false;
        }
        self.members.insert(connection.id, connection);
        true
    }

    /// Remove a connection, returning it if it was present
    pub fn leave(&mut self, id: ConnectionId) -> Option<Connection> {
        self.members.remove(&id)
    }

    /// IDs of the current members, used as the fan-out list
    pub fn snapshot(&self) -> Vec<ConnectionId> {
        self.members.keys().copied().collect()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.members.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
