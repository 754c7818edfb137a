//! TCP Chat Server - Entry Point
//!
//! Parses the port, binds the listener, and runs the ChatServer actor
//! and accept loop until Ctrl-C.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tcp_chat::{serve, ServerArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Usage errors exit here, before anything is bound
    let config = ServerArgs::parse().into_config();

    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=tcp_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tcp_chat=info")),
        )
        .init();

    // Bind failure is fatal
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on the port :{}", config.port);

    let _cmd_tx = serve(listener, config);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
