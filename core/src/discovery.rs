//! Listening-port discovery using lsof.

use std::collections::HashSet;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::config::ScanRange;
use crate::error::{Error, Result};
use crate::models::PortEntry;

/// Discovers listening TCP ports in a configured range.
pub struct PortScanner {
    range: ScanRange,
}

impl PortScanner {
    /// Create a scanner for the given port range.
    pub fn new(range: ScanRange) -> Self {
        Self { range }
    }

    /// Scan listening TCP ports in the configured range.
    ///
    /// Executes: `lsof -iTCP -sTCP:LISTEN -P -n -F pcn`
    ///
    /// Flags explained:
    /// - -iTCP: Show only TCP connections
    /// - -sTCP:LISTEN: Show only listening sockets
    /// - -P: Show port numbers (don't resolve to service names)
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - -F pcn: Machine-readable output, pid/command/name fields only
    ///
    /// lsof exits non-zero when no sockets matched; with empty output that
    /// is a legitimate empty result, not an error.
    pub async fn scan(&self) -> Result<Vec<PortEntry>> {
        debug!(min = self.range.min, max = self.range.max, "scanning listening TCP ports");

        let output = Command::new("lsof")
            .args(["-iTCP", "-sTCP:LISTEN", "-P", "-n", "-F", "pcn"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    Error::PermissionDenied(format!("cannot run lsof: {e}"))
                }
                _ => Error::CommandFailed(format!("Failed to run lsof: {e}")),
            })?;

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in lsof output: {e}")))?;

        if !output.status.success() && stdout.is_empty() {
            return Ok(Vec::new());
        }

        let entries = self.parse_lsof_output(&stdout);
        debug!(count = entries.len(), "discovered listening ports in range");
        Ok(entries)
    }

    /// Parse lsof field output into deduplicated, sorted entries.
    ///
    /// Expected lsof -F pcn output format, one field per line:
    /// ```text
    /// p34805
    /// cnode
    /// n[::1]:3000
    /// n127.0.0.1:3000
    /// ```
    /// A `p` line starts a new process group, `c` names it, and each `n`
    /// line is one listening socket. The port is whatever follows the last
    /// `:` in the name (IPv6 addresses contain colons of their own).
    fn parse_lsof_output(&self, output: &str) -> Vec<PortEntry> {
        let mut entries = Vec::new();
        let mut seen: HashSet<(u32, u16)> = HashSet::new();
        let mut current_pid: Option<u32> = None;
        let mut current_command = String::new();

        for line in output.lines() {
            let mut chars = line.chars();
            let Some(tag) = chars.next() else {
                continue;
            };
            let value = chars.as_str();

            match tag {
                'p' => {
                    current_pid = value.parse().ok();
                }
                'c' => {
                    current_command = value.to_string();
                }
                'n' => {
                    let Some(pid) = current_pid else {
                        continue;
                    };
                    let Some(port) = parse_port(value) else {
                        continue;
                    };
                    if !self.range.contains(port) {
                        continue;
                    }
                    // IPv4/IPv6 dual-stack listeners produce one n line per
                    // address family
                    if !seen.insert((pid, port)) {
                        continue;
                    }
                    entries.push(PortEntry::new(port, pid, current_command.clone()));
                }
                _ => {}
            }
        }

        entries.sort_by_key(|e| e.port);
        entries
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new(ScanRange::default())
    }
}

/// Extract the port from an lsof network name like `*:3000` or `[::1]:5173`.
fn parse_port(name: &str) -> Option<u16> {
    name.rsplit(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> PortScanner {
        PortScanner::new(ScanRange::default())
    }

    #[test]
    fn test_parse_lsof_output() {
        let output = "p34805\ncnode\nn[::1]:3000\np9120\ncvite\nn*:5173\n";

        let entries = scanner().parse_lsof_output(output);
        assert_eq!(entries.len(), 2);

        // Sorted by port
        assert_eq!(entries[0].port, 3000);
        assert_eq!(entries[0].pid, 34805);
        assert_eq!(entries[0].command, "node");

        assert_eq!(entries[1].port, 5173);
        assert_eq!(entries[1].pid, 9120);
        assert_eq!(entries[1].command, "vite");
    }

    #[test]
    fn test_deduplication() {
        // Dual-stack listener: same pid and port on IPv4 and IPv6
        let output = "p1234\ncnode\nn127.0.0.1:3000\nn[::1]:3000\n";

        let entries = scanner().parse_lsof_output(output);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].port, 3000);
        assert_eq!(entries[0].pid, 1234);
    }

    #[test]
    fn test_dedup_keeps_distinct_pids() {
        let output = "p111\ncnode\nn*:3000\np222\ncvite\nn*:5173\nn[::1]:5173\n";

        let entries = scanner().parse_lsof_output(output);
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].pid, entries[0].port), (111, 3000));
        assert_eq!((entries[1].pid, entries[1].port), (222, 5173));
    }

    #[test]
    fn test_range_filter() {
        let output = "p10\ncsshd\nn*:22\np11\ncnode\nn*:3000\np12\ncpostgres\nn*:5432\np13\ncweird\nn*:9001\n";

        let entries = scanner().parse_lsof_output(output);
        let ports: Vec<u16> = entries.iter().map(|e| e.port).collect();
        assert_eq!(ports, vec![3000, 5432]);
    }

    #[test]
    fn test_sorted_by_port() {
        let output = "p1\nca\nn*:8080\np2\ncb\nn*:3000\np3\ncc\nn*:5173\n";

        let entries = scanner().parse_lsof_output(output);
        let ports: Vec<u16> = entries.iter().map(|e| e.port).collect();
        assert_eq!(ports, vec![3000, 5173, 8080]);
    }

    #[test]
    fn test_ipv6_port_extraction() {
        let output = "p55\ncdeno\nn[fe80::1%lo0]:4444\n";

        let entries = scanner().parse_lsof_output(output);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].port, 4444);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let output = "pnotapid\ncnode\nn*:3000\np77\ncvite\nnno-port-here\nn*:5173\n";

        let entries = scanner().parse_lsof_output(output);
        // The n record under the unparsable pid is dropped; the well-formed
        // group survives.
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pid, 77);
        assert_eq!(entries[0].port, 5173);
    }

    #[test]
    fn test_empty_output() {
        assert!(scanner().parse_lsof_output("").is_empty());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("*:3000"), Some(3000));
        assert_eq!(parse_port("127.0.0.1:8080"), Some(8080));
        assert_eq!(parse_port("[::1]:5173"), Some(5173));
        assert_eq!(parse_port("no-colon"), None);
        assert_eq!(parse_port("*:*"), None);
    }
}
