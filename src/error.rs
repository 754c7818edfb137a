//! Error types for the chat server
//!
//! Defines application-level errors and outbound delivery errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

use crate::message::{NAME_EMPTY_NOTICE, SERVER_FULL_NOTICE};

/// Application-level errors
///
/// Covers both fatal errors (session termination) and handshake
/// rejections that are reported to the client before closing.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal for the session)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing error, including lines over the length limit
    #[error("Line codec error: {0}")]
    Lines(#[from] LinesCodecError),

    /// Command channel to the chat server is closed
    #[error("Channel send error")]
    ChannelSend,

    /// The chat server dropped a reply without answering
    #[error("Chat server closed")]
    ServerClosed,

    /// Client submitted an empty display name
    #[error("Name cannot be empty")]
    EmptyName,

    /// Registry is at capacity
    #[error("Server is full")]
    ServerFull,
}

impl AppError {
    /// Text sent to the client before the connection is closed
    ///
    /// Only handshake rejections have one; fatal errors close silently.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            AppError::EmptyName => Some(NAME_EMPTY_NOTICE),
            AppError::ServerFull => Some(SERVER_FULL_NOTICE),
            _ => None,
        }
    }
}

/// Outbound delivery errors
///
/// Returned when a line cannot be placed on a connection's queue.
/// Both variants lead to eviction of that connection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The queue is at capacity; the peer is not draining it
    #[error("Outbound queue full")]
    Full,

    /// The writer side has gone away
    #[error("Channel closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_errors_have_notices() {
        assert_eq!(AppError::EmptyName.notice(), Some("Name cannot be empty.\n"));
        assert_eq!(
            AppError::ServerFull.notice(),
            Some("Server is full. Try again later.\n")
        );
    }

    #[test]
    fn test_fatal_errors_have_no_notice() {
        assert!(AppError::ChannelSend.notice().is_none());
        assert!(AppError::ServerClosed.notice().is_none());
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(AppError::from(io).notice().is_none());
    }
}
