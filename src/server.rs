//! ChatServer Actor implementation
//!
//! The central actor that owns the dispatcher (registry + history).
//! Sessions talk to it through `ServerCommand`s on one mpsc channel;
//! commands are handled one at a time, which is what makes join,
//! broadcast and leave atomic and globally ordered.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::connection::Connection;
use crate::dispatcher::{Dispatcher, JoinOutcome};
use crate::error::AppError;
use crate::message::BroadcastMessage;
use crate::types::ConnectionId;

/// Commands sent from sessions to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Register a named connection; answered with the join outcome
    Join {
        connection: Connection,
        reply: oneshot::Sender<JoinOutcome>,
    },
    /// Record and fan out a line
    Broadcast {
        message: BroadcastMessage,
    },
    /// Session closed
    Leave {
        id: ConnectionId,
    },
    /// Number of registered members
    Occupancy {
        reply: oneshot::Sender<usize>,
    },
    /// Full history, oldest first
    History {
        reply: oneshot::Sender<Vec<String>>,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    /// Registry and history, touched only by this task
    dispatcher: Dispatcher,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a ChatServer admitting at most `capacity` members
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, capacity: usize) -> Self {
        Self {
            dispatcher: Dispatcher::new(capacity),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Join { connection, reply } => {
                self.handle_join(connection, reply);
            }
            ServerCommand::Broadcast { message } => {
                self.dispatcher.broadcast(message);
            }
            ServerCommand::Leave { id } => {
                if !self.dispatcher.leave(id) {
                    debug!("Connection {} already gone", id);
                }
            }
            ServerCommand::Occupancy { reply } => {
                let _ = reply.send(self.dispatcher.occupancy());
            }
            ServerCommand::History { reply } => {
                let _ = reply.send(self.dispatcher.replay());
            }
        }
    }

    /// Handle a join request
    fn handle_join(&mut self, connection: Connection, reply: oneshot::Sender<JoinOutcome>) {
        let id = connection.id;
        let outcome = self.dispatcher.join(connection);
        let joined = matches!(outcome, JoinOutcome::Joined { .. });

        // Session went away while waiting; undo the registration
        if reply.send(outcome).is_err() && joined {
            debug!("Join reply for {} dropped", id);
            self.dispatcher.leave(id);
        }
    }
}

/// Ask the actor to register `connection`
pub async fn join(
    cmd_tx: &mpsc::Sender<ServerCommand>,
    connection: Connection,
) -> Result<JoinOutcome, AppError> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(ServerCommand::Join { connection, reply })
        .await
        .map_err(|_| AppError::ChannelSend)?;
    rx.await.map_err(|_| AppError::ServerClosed)
}

/// Current number of registered members
pub async fn occupancy(cmd_tx: &mpsc::Sender<ServerCommand>) -> Result<usize, AppError> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(ServerCommand::Occupancy { reply })
        .await
        .map_err(|_| AppError::ChannelSend)?;
    rx.await.map_err(|_| AppError::ServerClosed)
}

/// Copy of the broadcast history
pub async fn history(cmd_tx: &mpsc::Sender<ServerCommand>) -> Result<Vec<String>, AppError> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(ServerCommand::History { reply })
        .await
        .map_err(|_| AppError::ChannelSend)?;
    rx.await.map_err(|_| AppError::ServerClosed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_server(capacity: usize) -> mpsc::Sender<ServerCommand> {
        let (cmd_tx, cmd_rx) = mpsc::channel(256);
        tokio::spawn(ChatServer::new(cmd_rx, capacity).run());
        cmd_tx
    }

    fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_join_and_leave_through_actor() {
        let cmd_tx = spawn_server(10);
        let (tx, _rx) = mpsc::channel(8);
        let conn = Connection::new(ConnectionId::new(), "alice", tx);
        let id = conn.id;

        let outcome = join(&cmd_tx, conn).await.unwrap();
        assert_eq!(outcome, JoinOutcome::Joined { replay: vec![] });
        assert_eq!(occupancy(&cmd_tx).await.unwrap(), 1);

        cmd_tx.send(ServerCommand::Leave { id }).await.unwrap();
        assert_eq!(occupancy(&cmd_tx).await.unwrap(), 0);
        assert_eq!(
            history(&cmd_tx).await.unwrap(),
            vec!["alice has joined the chat", "alice has left the chat"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_joins_never_exceed_capacity() {
        let cmd_tx = spawn_server(3);
        let mut tasks = Vec::new();

        for i in 0..10 {
            let cmd_tx = cmd_tx.clone();
            tasks.push(tokio::spawn(async move {
                let (tx, rx) = mpsc::channel(64);
                let conn = Connection::new(ConnectionId::new(), format!("user{}", i), tx);
                let outcome = join(&cmd_tx, conn).await.unwrap();
                (outcome, rx)
            }));
        }

        let mut accepted = 0;
        let mut receivers = Vec::new();
        for task in tasks {
            let (outcome, rx) = task.await.unwrap();
            if matches!(outcome, JoinOutcome::Joined { .. }) {
                accepted += 1;
            }
            receivers.push(rx);
        }

        assert_eq!(accepted, 3);
        assert_eq!(occupancy(&cmd_tx).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_broadcasts_share_one_order() {
        let cmd_tx = spawn_server(10);
        let (tx1, mut rx1) = mpsc::channel(256);
        let (tx2, mut rx2) = mpsc::channel(256);
        join(&cmd_tx, Connection::new(ConnectionId::new(), "obs1", tx1))
            .await
            .unwrap();
        join(&cmd_tx, Connection::new(ConnectionId::new(), "obs2", tx2))
            .await
            .unwrap();

        let mut senders = Vec::new();
        for s in 0..4 {
            let cmd_tx = cmd_tx.clone();
            senders.push(tokio::spawn(async move {
                let me = ConnectionId::new();
                let (tx, rx) = mpsc::channel(256);
                join(&cmd_tx, Connection::new(me, format!("sender{}", s), tx))
                    .await
                    .unwrap();
                for n in 0..25 {
                    let message = BroadcastMessage::from_sender(format!("s{}-{}", s, n), me);
                    cmd_tx
                        .send(ServerCommand::Broadcast { message })
                        .await
                        .unwrap();
                }
                rx
            }));
        }
        let mut sender_queues = Vec::new();
        for sender in senders {
            sender_queues.push(sender.await.unwrap());
        }

        let history = history(&cmd_tx).await.unwrap();
        assert_eq!(history.len(), 2 + 4 + 100);
        assert_eq!(drain(&mut rx1), history[1..].to_vec());
        assert_eq!(drain(&mut rx2), history[2..].to_vec());
    }

    #[tokio::test]
    async fn test_unregistered_sender_is_ignored() {
        let cmd_tx = spawn_server(10);
        let (tx, mut rx) = mpsc::channel(8);
        join(&cmd_tx, Connection::new(ConnectionId::new(), "alice", tx))
            .await
            .unwrap();

        let message = BroadcastMessage::from_sender("ghost line", ConnectionId::new());
        cmd_tx
            .send(ServerCommand::Broadcast { message })
            .await
            .unwrap();

        assert_eq!(history(&cmd_tx).await.unwrap(), vec!["alice has joined the chat"]);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_dropped_join_reply_unregisters() {
        let cmd_tx = spawn_server(10);
        let (tx, _rx) = mpsc::channel(8);
        let (reply, reply_rx) = oneshot::channel();
        drop(reply_rx);

        cmd_tx
            .send(ServerCommand::Join {
                connection: Connection::new(ConnectionId::new(), "ghost", tx),
                reply,
            })
            .await
            .unwrap();

        assert_eq!(occupancy(&cmd_tx).await.unwrap(), 0);
    }
}
