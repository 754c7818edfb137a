//! Line protocol definitions
//!
//! Plain-text protocol: every message is one `\n`-terminated line.
//! Holds the fixed handshake strings, notice formats, and the
//! `BroadcastMessage` passed from sessions to the dispatcher.

use chrono::{DateTime, Local, TimeZone};

use crate::types::ConnectionId;

/// Prompt that ends the welcome banner
pub const NAME_PROMPT: &str = "[ENTER YOUR NAME]: ";

/// Banner sent on connect, ending with the name prompt (no newline)
pub const WELCOME_BANNER: &str = r#"Welcome to TCP-Chat!
         _nnnn_
        dGGGGMMb
       @p~qp~~qMb
       M|@||@) M|
       @,----.JM|
      JS^\__/  qKL
     dZP        qKRb
    dZP          qKKb
   fZP            SMMb
   HZM            MMMM
   FqM            MMMM
 __| ".        |\dS"qML
 |    `.       | `' \Zq
_)      \.___.,|     .'
\____   )MMMMMP|   .'
     `-'       `--'
[ENTER YOUR NAME]: "#;

/// Sent when the first line is blank
pub const NAME_EMPTY_NOTICE: &str = "Name cannot be empty.\n";

/// Sent when the registry is at capacity
pub const SERVER_FULL_NOTICE: &str = "Server is full. Try again later.\n";

/// Timestamp layout used in chat lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A formatted line on its way to every member but `exclude`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    /// Line text without the trailing newline
    pub text: String,
    /// Originating connection, which does not get an echo
    pub exclude: Option<ConnectionId>,
}

impl BroadcastMessage {
    /// Message delivered to every member
    pub fn to_all(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exclude: None,
        }
    }

    /// Message delivered to every member except `sender`
    pub fn from_sender(text: impl Into<String>, sender: ConnectionId) -> Self {
        Self {
            text: text.into(),
            exclude: Some(sender),
        }
    }
}

/// `"<name> has joined the chat"`
pub fn join_notice(name: &str) -> String {
    format!("{} has joined the chat", name)
}

/// `"<name> has left the chat"`
pub fn leave_notice(name: &str) -> String {
    format!("{} has left the chat", name)
}

/// Format a chat line stamped with the current local time
pub fn chat_line(name: &str, body: &str) -> String {
    chat_line_at(&Local::now(), name, body)
}

/// Format a chat line as `"[<timestamp>][<name>]: <body>"`
pub fn chat_line_at<Tz>(at: &DateTime<Tz>, name: &str, body: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("[{}][{}]: {}", at.format(TIMESTAMP_FORMAT), name, body)
}
