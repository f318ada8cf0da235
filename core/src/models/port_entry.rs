//! Raw discovery result for a single listening socket.

use serde::{Deserialize, Serialize};

/// A listening TCP port and the process that owns it.
///
/// Produced by discovery and immutable once created. Identity is the
/// (pid, port) pair: a process listening on both the IPv4 and IPv6 stack
/// shows up once after deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortEntry {
    /// The port number (e.g. 3000, 5173).
    pub port: u16,

    /// Process ID of the listener.
    pub pid: u32,

    /// Short command name as reported by the socket listing.
    pub command: String,
}

impl PortEntry {
    /// Create a new entry from scan results.
    pub fn new(port: u16, pid: u32, command: impl Into<String>) -> Self {
        Self {
            port,
            pid,
            command: command.into(),
        }
    }
}

impl std::fmt::Display for PortEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ":{} (PID {}, {})", self.port, self.pid, self.command)
    }
}
