//! devkill Core Library
//!
//! Library for discovering and terminating local dev servers:
//! - Scan listening TCP ports in a configurable range (default 3000-9000)
//! - Resolve working directory and full command line per process
//! - Classify processes by framework (Next.js, Vite, ...) with ordered rules
//! - Deliver SIGTERM/SIGKILL with errno-classified failures
//!
//! # Platform Support
//! POSIX only: discovery and enrichment shell out to `lsof` and `ps`,
//! termination uses Unix signals.

pub mod config;
pub mod discovery;
pub mod enrich;
pub mod error;
pub mod kill;
pub mod models;

pub use config::{ScanRange, DEFAULT_MAX_PORT, DEFAULT_MIN_PORT};
pub use discovery::PortScanner;
pub use enrich::enrich;
pub use error::{Error, Result};
pub use kill::ProcessKiller;
pub use models::{detect_framework, PortEntry, ProcessInfo};
