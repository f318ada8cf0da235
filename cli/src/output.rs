//! Plain-text output helpers for the one-shot commands.

use std::fmt::Write as _;
use std::path::Path;

use devkill_core::{ProcessInfo, ScanRange};

/// Render discovered processes as a fixed-width table.
///
/// Pure function: no selection, no modes, no colors. Column widths are the
/// larger of a minimum and the longest value present; the directory divider
/// is capped at 40 dashes. Empty input yields a single "no servers found"
/// line instead of an empty table.
pub fn format_table(processes: &[ProcessInfo], range: ScanRange) -> String {
    if processes.is_empty() {
        return format!("\n  No dev servers found on ports {range}.\n\n");
    }

    let dirs: Vec<String> = processes.iter().map(|p| shorten_path(&p.cwd)).collect();

    let port_width = column_width(4, processes.iter().map(|p| p.port.to_string().len()));
    let pid_width = column_width(3, processes.iter().map(|p| p.pid.to_string().len()));
    let fw_width = column_width(7, processes.iter().map(|p| p.framework.len()));
    let dir_width = column_width("DIRECTORY".len(), dirs.iter().map(|d| d.len()));

    let mut out = String::from("\n");
    let _ = writeln!(
        out,
        "  {:<pw$}  {:<iw$}  {:<fw$}  DIRECTORY",
        "PORT",
        "PID",
        "PROCESS",
        pw = port_width,
        iw = pid_width,
        fw = fw_width,
    );
    let _ = writeln!(
        out,
        "  {}  {}  {}  {}",
        "\u{2500}".repeat(port_width),
        "\u{2500}".repeat(pid_width),
        "\u{2500}".repeat(fw_width),
        "\u{2500}".repeat(dir_width.min(40)),
    );

    for (proc, dir) in processes.iter().zip(&dirs) {
        let _ = writeln!(
            out,
            "  {:<pw$}  {:<iw$}  {:<fw$}  {}",
            proc.port,
            proc.pid,
            proc.framework,
            dir,
            pw = port_width,
            iw = pid_width,
            fw = fw_width,
        );
    }

    out.push('\n');
    out
}

/// The larger of a minimum width and the longest value present.
pub fn column_width(min: usize, lengths: impl Iterator<Item = usize>) -> usize {
    lengths.fold(min, usize::max)
}

/// Shorten a path by replacing the home directory prefix with `~`.
pub fn shorten_path(path: &str) -> String {
    shorten_with_home(path, dirs::home_dir().as_deref())
}

fn shorten_with_home(path: &str, home: Option<&Path>) -> String {
    if let Some(home) = home {
        if let Ok(rest) = Path::new(path).strip_prefix(home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
    }
    path.to_string()
}

/// Singular or plural noun for a process count.
pub fn process_noun(count: usize) -> &'static str {
    if count == 1 {
        "process"
    } else {
        "processes"
    }
}

/// Print a success line.
pub fn success(msg: &str) {
    println!("  \u{2713} {msg}");
}

/// Print a warning line.
pub fn warn(msg: &str) {
    println!("  \u{26a0} {msg}");
}

/// Print an error line to stderr.
pub fn error(msg: &str) {
    eprintln!("  \u{2717} {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use devkill_core::PortEntry;

    fn info(port: u16, pid: u32, framework: &str, cwd: &str) -> ProcessInfo {
        ProcessInfo::new(
            PortEntry::new(port, pid, "node"),
            cwd,
            format!("node {cwd}/server.js"),
            framework,
        )
    }

    #[test]
    fn test_empty_table() {
        let out = format_table(&[], ScanRange::default());
        assert_eq!(out, "\n  No dev servers found on ports 3000\u{2013}9000.\n\n");
    }

    #[test]
    fn test_empty_table_names_configured_range() {
        let out = format_table(&[], ScanRange::new(4000, 5000));
        assert!(out.contains("on ports 4000\u{2013}5000."));
    }

    #[test]
    fn test_table_layout() {
        let processes = vec![
            info(3000, 111, "Next.js", "/srv/web"),
            info(5173, 22222, "Vite", "/srv/app"),
        ];

        let out = format_table(&processes, ScanRange::default());
        let lines: Vec<&str> = out.lines().collect();

        // Leading blank line, header, divider, one line per process,
        // trailing blank line
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "");
        assert_eq!(lines[5], "");
        assert!(lines[1].starts_with("  PORT  PID    PROCESS  DIRECTORY"));
        assert!(lines[3].starts_with("  3000  111    Next.js  /srv/web"));
        assert!(lines[4].starts_with("  5173  22222  Vite     /srv/app"));
    }

    #[test]
    fn test_column_minimum_widths() {
        // Everything shorter than the header minimums
        let processes = vec![info(80, 1, "Vite", "/a")];
        let out = format_table(&processes, ScanRange::new(1, 9000));

        // port padded to 4, pid to 3, framework to 7
        assert!(out.contains("  80    1    Vite     /a"));
    }

    #[test]
    fn test_columns_grow_to_content() {
        assert_eq!(column_width(4, [2, 5, 3].into_iter()), 5);
        assert_eq!(column_width(4, [1, 2].into_iter()), 4);
        assert_eq!(column_width(7, std::iter::empty()), 7);
    }

    #[test]
    fn test_divider_cap() {
        let long_dir = "/very/long/path/that/keeps/going/and/going/and/going/far/beyond";
        let processes = vec![info(3000, 1, "Node", long_dir)];
        let out = format_table(&processes, ScanRange::default());

        let divider = out.lines().nth(2).unwrap();
        let last_run = divider.rsplit("  ").next().unwrap();
        assert_eq!(last_run.chars().count(), 40);
    }

    #[test]
    fn test_shorten_with_home() {
        let home = Path::new("/home/dev");
        assert_eq!(shorten_with_home("/home/dev/projects/web", Some(home)), "~/projects/web");
        assert_eq!(shorten_with_home("/home/dev", Some(home)), "~");
        assert_eq!(shorten_with_home("/srv/web", Some(home)), "/srv/web");
        assert_eq!(shorten_with_home("/home/dev/app", None), "/home/dev/app");
    }

    #[test]
    fn test_shorten_respects_component_boundaries() {
        let home = Path::new("/home/dev");
        assert_eq!(shorten_with_home("/home/developer/app", Some(home)), "/home/developer/app");
    }

    #[test]
    fn test_process_noun() {
        assert_eq!(process_noun(0), "processes");
        assert_eq!(process_noun(1), "process");
        assert_eq!(process_noun(2), "processes");
    }
}
