//! Server configuration
//!
//! `ServerConfig` carries the tunables of a running server. `ServerArgs`
//! is the command line surface, which only selects the port.

use clap::Parser;

/// Port used when none is given on the command line
pub const DEFAULT_PORT: u16 = 8989;

/// Maximum number of joined members
pub const DEFAULT_CAPACITY: usize = 10;

/// Lines buffered per member before it counts as too slow
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Channel buffer size for server commands
pub const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Longest accepted input line, in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Settings for one server instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP port to listen on (all interfaces)
    pub port: u16,
    /// Registry capacity
    pub capacity: usize,
    /// Outbound queue size per connection
    pub queue_capacity: usize,
    /// Actor command channel size
    pub command_buffer: usize,
    /// Input lines longer than this end the session
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            capacity: DEFAULT_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl ServerConfig {
    /// Address to bind, on all interfaces
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }
}

/// Command line arguments of the server binary
#[derive(Debug, Parser)]
#[command(name = "tcp_chat", about = "Line-based TCP chat relay")]
pub struct ServerArgs {
    /// Port to listen on
    pub port: Option<u16>,
}

impl ServerArgs {
    /// Build the server configuration, keeping defaults for everything else
    pub fn into_config(self) -> ServerConfig {
        let config = ServerConfig::default();
        match self.port {
            Some(port) => config.with_port(port),
            None => config,
        }
    }
}
