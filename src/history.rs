//! History buffer
//!
//! Append-only log of every broadcast line, replayed to new members.

/// Ordered log of broadcast lines
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line
    pub fn record(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    /// Copy of everything recorded so far, oldest first
    pub fn replay(&self) -> Vec<String> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
