//! Connection handle definition
//!
//! The registry's view of a joined client: its identity, display name,
//! the sending side of its bounded outbound queue, and the signal that
//! tells its session it has been evicted.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::error::DeliveryError;
use crate::types::ConnectionId;

/// Joined client as seen by the registry
///
/// The session loop keeps the queue receiver and the socket; the
/// registry keeps this handle. A writer blocked on a full socket never
/// sees the queue close, so eviction also cancels `evicted`, which the
/// session waits on to tear itself down.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Display name, fixed at join
    pub name: String,
    /// Server → client line queue
    pub sender: mpsc::Sender<String>,
    /// Cancelled when the dispatcher evicts this connection
    evicted: CancellationToken,
}

impl Connection {
    /// Create a new handle with the given ID, name and queue sender
    pub fn new(id: ConnectionId, name: impl Into<String>, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sender,
            evicted: CancellationToken::new(),
        }
    }

    /// Enqueue a line without waiting
    ///
    /// Never blocks the caller; a full or closed queue is reported so the
    /// dispatcher can evict this connection.
    pub fn try_deliver(&self, line: &str) -> Result<(), DeliveryError> {
        self.sender
            .try_send(line.to_string())
            .map_err(|e| match e {
                TrySendError::Full(_) => DeliveryError::Full,
                TrySendError::Closed(_) => DeliveryError::Closed,
            })
    }

    /// Signal the session waits on; clone it before handing the
    /// connection to the registry
    pub fn eviction_signal(&self) -> CancellationToken {
        self.evicted.clone()
    }

    /// Tell the session to close
    pub fn evict(&self) {
        self.evicted.cancel();
    }
}
