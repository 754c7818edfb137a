//! TCP session handler
//!
//! Drives one connection through its lifecycle: banner and name
//! handshake, registration with the ChatServer, concurrent reader and
//! writer paths, and teardown.

use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::dispatcher::JoinOutcome;
use crate::error::AppError;
use crate::message::{chat_line, BroadcastMessage, WELCOME_BANNER};
use crate::server::{self, ServerCommand};
use crate::types::ConnectionId;

type LineReader = FramedRead<OwnedReadHalf, LinesCodec>;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Socket accepted, banner not yet sent
    Connecting,
    /// Waiting for the display name
    Handshaking,
    /// Registered; reader and writer running
    Active,
    /// One path ended, leaving the registry
    Closing,
    /// Socket released
    Closed,
}

/// Handle a new TCP connection
///
/// Runs the handshake, then splits into a reader task (socket → broadcast)
/// and a writer task (queue → socket). Whichever ends first closes the
/// session; the other is aborted and the connection leaves the chat.
/// Eviction aborts both.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    config: ServerConfig,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    transition(&peer_addr, SessionState::Connecting);

    let (read_half, mut write_half) = stream.into_split();
    let mut lines = FramedRead::new(
        read_half,
        LinesCodec::new_with_max_length(config.max_line_length),
    );

    write_half.write_all(WELCOME_BANNER.as_bytes()).await?;
    transition(&peer_addr, SessionState::Handshaking);

    let name = match read_name(&mut lines).await {
        Ok(Some(name)) => name,
        Ok(None) => {
            debug!("{} closed before sending a name", peer_addr);
            transition(&peer_addr, SessionState::Closed);
            return Ok(());
        }
        Err(e) => return reject(&peer_addr, write_half, e).await,
    };

    // Create channel for server -> client lines
    let id = ConnectionId::new();
    let (out_tx, out_rx) = mpsc::channel::<String>(config.queue_capacity);
    let connection = Connection::new(id, name.clone(), out_tx);
    let evicted = connection.eviction_signal();

    let replay = match server::join(&cmd_tx, connection).await? {
        JoinOutcome::Joined { replay } => replay,
        JoinOutcome::Full => return reject(&peer_addr, write_half, AppError::ServerFull).await,
    };

    info!("{} joined as '{}' ({})", peer_addr, name, id);
    transition(&peer_addr, SessionState::Active);

    let mut read_task = tokio::spawn(read_lines(lines, cmd_tx.clone(), id, name.clone()));
    let mut write_task = tokio::spawn(write_lines(write_half, replay, out_rx));

    // Wait for either path to complete, or for eviction. Aborted tasks are
    // awaited so both socket halves are dropped before leaving.
    tokio::select! {
        result = &mut read_task => {
            if let Ok(Err(e)) = result {
                debug!("Read path for {} failed: {}", id, e);
            }
            write_task.abort();
            let _ = write_task.await;
        }
        result = &mut write_task => {
            if let Ok(Err(e)) = result {
                debug!("Write path for {} failed: {}", id, e);
            }
            read_task.abort();
            let _ = read_task.await;
        }
        _ = evicted.cancelled() => {
            info!("'{}' ({}) evicted", name, id);
            read_task.abort();
            write_task.abort();
            let _ = read_task.await;
            let _ = write_task.await;
        }
    }

    transition(&peer_addr, SessionState::Closing);

    if cmd_tx.send(ServerCommand::Leave { id }).await.is_err() {
        error!("Failed to deregister {} - server closed", id);
    }

    info!("'{}' ({}) disconnected", name, id);
    transition(&peer_addr, SessionState::Closed);

    Ok(())
}

/// Read the display name line
///
/// `Ok(None)` when the stream ends first.
async fn read_name(lines: &mut LineReader) -> Result<Option<String>, AppError> {
    let Some(line) = lines.next().await else {
        return Ok(None);
    };

    let name = line?.trim().to_string();
    if name.is_empty() {
        return Err(AppError::EmptyName);
    }
    Ok(Some(name))
}

/// End a session that failed the handshake
///
/// Rejections with a client notice are written out and the socket is shut
/// down cleanly; anything else is returned to the caller.
async fn reject(
    peer_addr: &str,
    mut write_half: OwnedWriteHalf,
    err: AppError,
) -> Result<(), AppError> {
    let Some(notice) = err.notice() else {
        return Err(err);
    };

    info!("Rejected {}: {}", peer_addr, err);
    write_half.write_all(notice.as_bytes()).await?;
    write_half.shutdown().await?;
    transition(peer_addr, SessionState::Closed);
    Ok(())
}

/// Reader path: socket lines → broadcasts
async fn read_lines(
    mut lines: LineReader,
    cmd_tx: mpsc::Sender<ServerCommand>,
    id: ConnectionId,
    name: String,
) -> Result<(), AppError> {
    while let Some(line) = lines.next().await {
        let line = line?;
        let body = line.trim();
        if body.is_empty() {
            continue;
        }

        let message = BroadcastMessage::from_sender(chat_line(&name, body), id);
        cmd_tx
            .send(ServerCommand::Broadcast { message })
            .await
            .map_err(|_| AppError::ChannelSend)?;
    }

    debug!("Read path ended for {}", id);
    Ok(())
}

/// Writer path: replay, then queued lines → socket
///
/// Ends when the queue closes. A writer stuck on a full socket is
/// aborted by the session instead.
async fn write_lines(
    write_half: OwnedWriteHalf,
    replay: Vec<String>,
    mut out_rx: mpsc::Receiver<String>,
) -> Result<(), AppError> {
    let mut sink = FramedWrite::new(write_half, LinesCodec::new());

    for line in replay {
        sink.feed(line).await?;
    }
    SinkExt::<String>::flush(&mut sink).await?;

    while let Some(line) = out_rx.recv().await {
        sink.send(line).await?;
    }

    debug!("Outbound queue closed");
    SinkExt::<String>::close(&mut sink).await?;
    Ok(())
}

fn transition(peer_addr: &str, state: SessionState) {
    debug!("{} -> {:?}", peer_addr, state);
}
