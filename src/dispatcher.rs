//! Dispatcher
//!
//! Owns the registry and the history buffer, and performs join, leave
//! and ordered fan-out. Every method runs to completion on `&mut self`,
//! so whoever owns the dispatcher (the `ChatServer` actor) gets atomic,
//! globally ordered operations without a lock.
//!
//! # Backpressure
//! Delivery uses `try_send` on each member's bounded queue. A member
//! whose queue is full (or already closed) is evicted on the spot: it is
//! removed from the registry, its queue sender is dropped and its
//! eviction signal is cancelled, which makes the session abort both
//! paths and close the socket even if its writer is stuck on a full
//! socket. The eviction broadcasts the member's leave notice, so a later
//! `leave` for the same connection is a no-op and exactly one notice is
//! produced. Lines still in flight from an evicted session are dropped,
//! since only registered members may broadcast.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::history::History;
use crate::message::{join_notice, leave_notice, BroadcastMessage};
use crate::registry::Registry;
use crate::types::ConnectionId;

/// Result of a join attempt
#[derive(Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Registered; `replay` is the history as it stood just before joining
    Joined { replay: Vec<String> },
    /// Registry at capacity, nothing changed
    Full,
}

/// Registry + history with ordered fan-out
#[derive(Debug)]
pub struct Dispatcher {
    registry: Registry,
    history: History,
}

impl Dispatcher {
    /// Create a dispatcher whose registry holds at most `capacity` members
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Registry::new(capacity),
            history: History::new(),
        }
    }

    /// Register a connection and announce it
    ///
    /// The replay snapshot is taken before the joiner's own join notice is
    /// recorded, and the notice excludes the joiner. Everything broadcast
    /// after this call reaches the joiner through its queue, so replay plus
    /// live delivery has no gap and no duplicate.
    pub fn join(&mut self, connection: Connection) -> JoinOutcome {
        let id = connection.id;
        let name = connection.name.clone();

        if !self.registry.join(connection) {
            info!("Rejected '{}' ({}): server full", name, id);
            return JoinOutcome::Full;
        }
        let replay = self.history.replay();

        info!("'{}' ({}) joined", name, id);
        self.broadcast(BroadcastMessage::from_sender(join_notice(&name), id));
        debug!(
            "Members: {}/{}, history: {}",
            self.registry.len(),
            self.registry.capacity(),
            self.history.len()
        );

        JoinOutcome::Joined { replay }
    }

    /// Deregister a connection and announce its departure
    ///
    /// Returns false if it was not registered (never joined, already left,
    /// or evicted); no notice is sent in that case.
    pub fn leave(&mut self, id: ConnectionId) -> bool {
        let Some(connection) = self.registry.leave(id) else {
            return false;
        };

        info!("'{}' ({}) left", connection.name, id);
        self.broadcast(BroadcastMessage::to_all(leave_notice(&connection.name)));
        true
    }

    /// Record a message and deliver it to every member except `exclude`
    ///
    /// Never waits on a member. Leave notices for members evicted along the
    /// way are broadcast right after, within the same call.
    pub fn broadcast(&mut self, message: BroadcastMessage) {
        let mut pending = VecDeque::from([message]);

        while let Some(message) = pending.pop_front() {
            if let Some(sender) = message.exclude {
                if !self.registry.contains(sender) {
                    debug!("Dropping line from unregistered {}", sender);
                    continue;
                }
            }

            debug!("Broadcasting: {}", message.text);
            self.history.record(message.text.as_str());

            let mut evicted = Vec::new();
            for id in self.registry.snapshot() {
                if Some(id) == message.exclude {
                    continue;
                }
                let Some(connection) = self.registry.get(id) else {
                    continue;
                };
                if let Err(e) = connection.try_deliver(&message.text) {
                    warn!("Evicting '{}' ({}): {}", connection.name, id, e);
                    evicted.push(id);
                }
            }

            for id in evicted {
                if let Some(connection) = self.registry.leave(id) {
                    connection.evict();
                    pending.push_back(BroadcastMessage::to_all(leave_notice(&connection.name)));
                }
            }
        }
    }

    /// Current number of members
    pub fn occupancy(&self) -> usize {
        self.registry.len()
    }

    /// Copy of the full history, oldest first
    pub fn replay(&self) -> Vec<String> {
        self.history.replay()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}
