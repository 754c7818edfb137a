//! Multi-client TCP Chat Relay Library
//!
//! Clients connect over raw TCP, pick a display name, and exchange
//! newline-delimited text that the server fans out to everyone else.
//!
//! # Features
//! - Welcome banner and name handshake
//! - Fixed member capacity, enforced at join time
//! - Timestamped chat lines, join and leave notices
//! - History replay for newly joined clients
//! - Eviction of clients that cannot keep up
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor; it owns the `Dispatcher`,
//!   which in turn owns the `Registry` and the `History`
//! - Each connection has a session task plus reader and writer tasks
//! - No locks needed - join, broadcast and leave are commands the actor
//!   processes one at a time, so they are atomic and totally ordered
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tcp_chat::{serve, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let listener = TcpListener::bind(config.bind_addr()).await.unwrap();
//!     let _cmd_tx = serve(listener, config);
//!     tokio::signal::ctrl_c().await.unwrap();
//! }
//! ```

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod history;
pub mod listener;
pub mod message;
pub mod registry;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use config::{ServerArgs, ServerConfig};
pub use connection::Connection;
pub use dispatcher::{Dispatcher, JoinOutcome};
pub use error::{AppError, DeliveryError};
pub use handler::{handle_connection, SessionState};
pub use history::History;
pub use listener::{accept_loop, serve};
pub use message::BroadcastMessage;
pub use registry::Registry;
pub use server::{ChatServer, ServerCommand};
pub use types::ConnectionId;
