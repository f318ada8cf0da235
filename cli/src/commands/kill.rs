//! Kill command: terminate the dev server on one port, or all of them.

use anyhow::Result;
use devkill_core::{enrich, Error, PortScanner, ProcessInfo, ProcessKiller, ScanRange};
use tracing::debug;

use crate::output;

/// One printable line of a kill report.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReportLine {
    Success(String),
    Warning(String),
    Error(String),
    Plain(String),
}

/// Everything a kill invocation prints, plus the exit code it ends with.
///
/// Built by pure functions over the discovered processes and the per-pid
/// signal results; printing and exiting happen once, in [`run`].
#[derive(Debug, PartialEq, Eq)]
struct KillReport {
    lines: Vec<ReportLine>,
    exit_code: i32,
}

pub async fn run(port: Option<u16>, all: bool, force: bool, range: ScanRange) -> Result<()> {
    debug!(?port, all, force, "kill command");

    let entries = PortScanner::new(range).scan().await?;
    let processes = enrich(entries).await?;

    let killer = ProcessKiller::new();
    let report = if all {
        kill_all_report(&processes, force, |pid, force| killer.kill(pid, force))
    } else {
        // clap guarantees a port whenever --all is absent
        let Some(port) = port else {
            output::error("Specify a port number or pass --all.");
            std::process::exit(1);
        };
        kill_one_report(&processes, port, force, |pid, force| killer.kill(pid, force))
    };

    print_report(&report);
    if report.exit_code != 0 {
        std::process::exit(report.exit_code);
    }
    Ok(())
}

/// Report for killing the single process on one port.
///
/// No match exits 1; an already-exited target is benign and exits 0;
/// permission denial and other delivery failures exit 1.
fn kill_one_report<F>(processes: &[ProcessInfo], port: u16, force: bool, mut kill: F) -> KillReport
where
    F: FnMut(u32, bool) -> devkill_core::Result<()>,
{
    let Some(target) = processes.iter().find(|p| p.port == port) else {
        return KillReport {
            lines: vec![ReportLine::Error(format!(
                "No process found listening on port {port}."
            ))],
            exit_code: 1,
        };
    };

    match kill(target.pid, force) {
        Ok(()) => KillReport {
            lines: vec![ReportLine::Success(format!(
                "Killed {} on port {} (PID {}) with {}",
                target.framework,
                target.port,
                target.pid,
                signal_name(force),
            ))],
            exit_code: 0,
        },
        Err(Error::ProcessNotFound(_)) => KillReport {
            lines: vec![ReportLine::Warning(format!(
                "Process on port {} (PID {}) already exited.",
                target.port, target.pid
            ))],
            exit_code: 0,
        },
        Err(Error::PermissionDenied(_)) => KillReport {
            lines: vec![ReportLine::Error(format!(
                "Permission denied killing PID {}. Try sudo.",
                target.pid
            ))],
            exit_code: 1,
        },
        Err(Error::KillFailed { reason, .. }) => KillReport {
            lines: vec![ReportLine::Error(format!(
                "Failed to kill PID {}: {reason}",
                target.pid
            ))],
            exit_code: 1,
        },
        Err(e) => KillReport {
            lines: vec![ReportLine::Error(format!(
                "Failed to kill PID {}: {e}",
                target.pid
            ))],
            exit_code: 1,
        },
    }
}

/// Report for sweeping every discovered server.
///
/// Individual failures are reported and skipped; the walk itself never
/// aborts and the command always exits 0.
fn kill_all_report<F>(processes: &[ProcessInfo], force: bool, mut kill: F) -> KillReport
where
    F: FnMut(u32, bool) -> devkill_core::Result<()>,
{
    if processes.is_empty() {
        return KillReport {
            lines: vec![ReportLine::Warning("No dev servers found to kill.".to_string())],
            exit_code: 0,
        };
    }

    let mut lines = Vec::new();
    let mut killed = 0;

    for proc in processes {
        match kill(proc.pid, force) {
            Ok(()) => {
                lines.push(ReportLine::Success(format!(
                    "Killed {} on port {} (PID {}) with {}",
                    proc.framework,
                    proc.port,
                    proc.pid,
                    signal_name(force),
                )));
                killed += 1;
            }
            Err(Error::ProcessNotFound(_)) => {
                lines.push(ReportLine::Warning(format!(
                    "Process on port {} (PID {}) already exited.",
                    proc.port, proc.pid
                )));
            }
            Err(Error::PermissionDenied(_)) => {
                lines.push(ReportLine::Error(format!(
                    "Permission denied killing PID {} (port {}).",
                    proc.pid, proc.port
                )));
            }
            Err(Error::KillFailed { reason, .. }) => {
                lines.push(ReportLine::Error(format!(
                    "Failed to kill PID {}: {reason}",
                    proc.pid
                )));
            }
            Err(e) => {
                lines.push(ReportLine::Error(format!("Failed to kill PID {}: {e}", proc.pid)));
            }
        }
    }

    if killed == 0 {
        lines.push(ReportLine::Warning("No processes were killed.".to_string()));
    } else {
        lines.push(ReportLine::Plain(format!(
            "\n  Killed {killed} {}.",
            output::process_noun(killed)
        )));
    }

    KillReport { lines, exit_code: 0 }
}

fn print_report(report: &KillReport) {
    for line in &report.lines {
        match line {
            ReportLine::Success(text) => output::success(text),
            ReportLine::Warning(text) => output::warn(text),
            ReportLine::Error(text) => output::error(text),
            ReportLine::Plain(text) => println!("{text}"),
        }
    }
}

fn signal_name(force: bool) -> &'static str {
    if force {
        "SIGKILL"
    } else {
        "SIGTERM"
    }
}
