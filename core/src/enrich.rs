//! Process enrichment: batched metadata lookups and framework classification.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{detect_framework, PortEntry, ProcessInfo};

/// Resolve working directories and full command lines for discovered
/// entries, then classify each by framework.
///
/// The two batched lookups run concurrently. Entries whose command matches
/// no framework rule are dropped; the input order is preserved for the
/// survivors. Either lookup may be missing individual pids (the process can
/// exit between discovery and enrichment), in which case the corresponding
/// fields are empty and classification falls back to the short command.
pub async fn enrich(entries: Vec<PortEntry>) -> Result<Vec<ProcessInfo>> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let pids = distinct_pids(&entries);
    debug!(pids = pids.len(), "resolving process metadata");

    let (cwds, commands) = tokio::join!(batch_cwds(&pids), batch_command_lines(&pids));
    let cwds = cwds?;
    let commands = commands?;

    let infos = assemble(entries, &cwds, &commands);
    debug!(count = infos.len(), "classified dev server processes");
    Ok(infos)
}

/// Distinct pids in first-appearance order.
fn distinct_pids(entries: &[PortEntry]) -> Vec<u32> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.pid))
        .map(|e| e.pid)
        .collect()
}

fn join_pids(pids: &[u32]) -> String {
    pids.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Batch-resolve working directories for a set of pids.
///
/// Executes: `lsof -a -d cwd -F pn -p <pid1,pid2,...>`
///
/// lsof exits non-zero when some of the pids are already gone; the partial
/// output is still parsed.
async fn batch_cwds(pids: &[u32]) -> Result<HashMap<u32, String>> {
    if pids.is_empty() {
        return Ok(HashMap::new());
    }

    let output = Command::new("lsof")
        .args(["-a", "-d", "cwd", "-F", "pn", "-p", &join_pids(pids)])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::CommandFailed(format!("Failed to run lsof: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_cwd_output(&stdout))
}

/// Parse lsof -F pn output into a pid -> cwd map.
///
/// ```text
/// p34805
/// n/home/user/projects/web
/// ```
fn parse_cwd_output(output: &str) -> HashMap<u32, String> {
    let mut cwds = HashMap::new();
    let mut current_pid: Option<u32> = None;

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
            'n' => {
                if let Some(pid) = current_pid {
                    cwds.insert(pid, value.to_string());
                }
            }
            _ => {}
        }
    }

    cwds
}

/// Batch-resolve full command lines for a set of pids.
///
/// Executes: `ps -o pid=,args= -p <pid1,pid2,...>`
///
/// The `=` suffixes suppress the header line.
async fn batch_command_lines(pids: &[u32]) -> Result<HashMap<u32, String>> {
    if pids.is_empty() {
        return Ok(HashMap::new());
    }

    let output = Command::new("ps")
        .args(["-o", "pid=,args=", "-p", &join_pids(pids)])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::CommandFailed(format!("Failed to run ps: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_ps_output(&stdout))
}

/// Parse `ps -o pid=,args=` output into a pid -> command-line map.
fn parse_ps_output(output: &str) -> HashMap<u32, String> {
    let mut commands = HashMap::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Split into pid and args (only first split)
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let Some(pid_str) = parts.next() else {
            continue;
        };
        let Some(args) = parts.next() else {
            continue;
        };
        let Ok(pid) = pid_str.parse::<u32>() else {
            continue;
        };

        commands.insert(pid, args.trim().to_string());
    }

    commands
}

/// Combine entries with resolved metadata, keeping only classified ones.
fn assemble(
    entries: Vec<PortEntry>,
    cwds: &HashMap<u32, String>,
    commands: &HashMap<u32, String>,
) -> Vec<ProcessInfo> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let cwd = cwds.get(&entry.pid).cloned().unwrap_or_default();
            let full_command = commands.get(&entry.pid).cloned().unwrap_or_default();
            let framework = detect_framework(&full_command, &entry.command)?;
            Some(ProcessInfo::new(entry, cwd, full_command, framework))
        })
        .collect()
}
