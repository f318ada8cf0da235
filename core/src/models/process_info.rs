//! Enriched process metadata for a discovered dev server.

use serde::{Deserialize, Serialize};

use super::PortEntry;

/// A discovered dev server with resolved process metadata.
///
/// Built by enrichment from a [`PortEntry`] plus the batched working
/// directory and command-line lookups. Entries whose command matched no
/// framework rule never become a `ProcessInfo`, so `framework` is always
/// a real label. `cwd` and `full_command` are empty when the lookup had
/// no record for the pid (the process may have exited mid-enrichment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// The port number the server listens on.
    pub port: u16,

    /// Process ID.
    pub pid: u32,

    /// Short command name from discovery.
    pub command: String,

    /// Working directory of the process, or empty if unresolved.
    pub cwd: String,

    /// Full command line that started the process, or empty if unresolved.
    pub full_command: String,

    /// Detected framework label (e.g. "Next.js", "Vite").
    pub framework: String,
}

impl ProcessInfo {
    /// Assemble from a discovery entry and resolved metadata.
    pub fn new(
        entry: PortEntry,
        cwd: impl Into<String>,
        full_command: impl Into<String>,
        framework: impl Into<String>,
    ) -> Self {
        Self {
            port: entry.port,
            pid: entry.pid,
            command: entry.command,
            cwd: cwd.into(),
            full_command: full_command.into(),
            framework: framework.into(),
        }
    }
}

impl std::fmt::Display for ProcessInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} on port {} (PID {})",
            self.framework, self.port, self.pid
        )
    }
}
