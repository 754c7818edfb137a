//! Connection acceptor
//!
//! Accepts sockets and launches one session task per connection.
//! Capacity is enforced by the ChatServer at join time, not here.

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::handler::handle_connection;
use crate::server::{ChatServer, ServerCommand};

/// Accept connections forever
///
/// Accept failures are logged and the loop continues; a slow session
/// never holds up the next accept.
pub async fn accept_loop(
    listener: TcpListener,
    cmd_tx: mpsc::Sender<ServerCommand>,
    config: ServerConfig,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                // Spawn session task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, config).await {
                        error!("Session error for {}: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Start the ChatServer actor and serve `listener`
///
/// Returns the command sender so callers can query the running server.
/// The accept loop runs on its own task until the runtime shuts down.
pub fn serve(listener: TcpListener, config: ServerConfig) -> mpsc::Sender<ServerCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    tokio::spawn(ChatServer::new(cmd_rx, config.capacity).run());
    info!("ChatServer actor started");

    tokio::spawn(accept_loop(listener, cmd_tx.clone(), config));
    cmd_tx
}
