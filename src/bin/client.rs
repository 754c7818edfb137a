//! TCP Chat Client
//!
//! Sends stdin lines to the server and prints everything the server
//! sends. Typing `exit` ends the client.

use std::io::BufRead;

use clap::Parser;
use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedWrite, LinesCodec};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Line typed to leave the chat
const EXIT_COMMAND: &str = "exit";

#[derive(Debug, Parser)]
#[command(name = "tcp_chat_client", about = "Client for the TCP chat relay")]
struct ClientArgs {
    /// Server host name or IP
    host: String,
    /// Server port
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ClientArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stream = TcpStream::connect((args.host.as_str(), args.port)).await?;
    let (mut read_half, write_half) = stream.into_split();
    let mut outgoing = FramedWrite::new(write_half, LinesCodec::new());

    // Raw copy so the name prompt shows before its line is complete
    let mut print_task = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        if let Err(e) = tokio::io::copy(&mut read_half, &mut stdout).await {
            warn!("Connection error: {}", e);
        }
    });

    // Blocking stdin lives on its own thread so exiting never waits on it
    let (stdin_tx, mut stdin_rx) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if stdin_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut print_task => {
                debug!("Server closed the connection");
                break;
            }
            line = stdin_rx.recv() => {
                let Some(line) = line else { break };
                let line = line.trim();
                if line == EXIT_COMMAND {
                    break;
                }
                outgoing.send(line).await?;
            }
        }
    }

    let _ = SinkExt::<&str>::close(&mut outgoing).await;
    Ok(())
}
