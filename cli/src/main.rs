//! devkill: find and kill local dev servers.
//!
//! Scans the configured port range for listening TCP servers, classifies
//! them by framework, and either prints them, kills them, or drives an
//! interactive session for picking targets one at a time.

mod commands;
mod output;
mod tui;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{ArgAction, Parser, Subcommand};
use devkill_core::{ScanRange, DEFAULT_MAX_PORT, DEFAULT_MIN_PORT};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devkill")]
#[command(about = "Find and kill local dev servers", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Lowest port to scan
    #[arg(long, global = true, default_value_t = DEFAULT_MIN_PORT)]
    min_port: u16,

    /// Highest port to scan
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PORT)]
    max_port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// List all discovered dev servers (default)
    #[command(alias = "ls")]
    List {
        /// Emit JSON instead of the table
        #[arg(long)]
        json: bool,
    },

    /// Kill the server on a port, or every discovered server
    Kill {
        /// Port number to kill
        #[arg(required_unless_present = "all")]
        port: Option<u16>,

        /// Kill all discovered dev servers
        #[arg(short, long)]
        all: bool,

        /// Send SIGKILL instead of SIGTERM
        #[arg(short, long)]
        force: bool,
    },

    /// Browse and kill servers interactively
    #[command(alias = "i")]
    Interactive,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // help and version print to stdout and exit 0; usage errors
            // go to stderr and exit 1
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };

    let interactive = matches!(cli.command, Some(Commands::Interactive));
    init_logging(interactive);

    let range = ScanRange::new(cli.min_port, cli.max_port);

    match cli.command {
        Some(Commands::List { json }) => commands::list::run(range, json).await?,
        Some(Commands::Kill { port, all, force }) => {
            commands::kill::run(port, all, force, range).await?
        }
        Some(Commands::Interactive) => tui::run(range).await?,
        None => commands::list::run(range, false).await?,
    }

    Ok(())
}

/// Interactive mode logs to a file under the state directory: stderr
/// shares the terminal with the alternate screen, and writing to it
/// mid-session corrupts the display.
fn init_logging(interactive: bool) {
    if interactive {
        match create_log_file() {
            Some(file) => {
                let filter = EnvFilter::from_default_env().add_directive(
                    "devkill=info"
                        .parse()
                        .unwrap_or_else(|_| tracing::Level::INFO.into()),
                );
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .init();
            }
            None => {
                tracing_subscriber::fmt()
                    .with_env_filter(EnvFilter::new("off"))
                    .init();
            }
        }
    } else {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devkill=warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn state_dir() -> Option<PathBuf> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg_state).join("devkill"));
    }
    dirs::home_dir().map(|home| home.join(".local").join("state").join("devkill"))
}

fn create_log_file() -> Option<fs::File> {
    let log_dir = state_dir()?;
    if fs::create_dir_all(&log_dir).is_err() {
        return None;
    }
    let log_path = log_dir.join("tui.log");
    OpenOptions::new().create(true).append(true).open(log_path).ok()
}
