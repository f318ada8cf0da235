//! List command: print every discovered dev server once and exit.

use anyhow::Result;
use devkill_core::{enrich, Error, PortScanner, ProcessInfo, ScanRange};
use tracing::debug;

use crate::output;

pub async fn run(range: ScanRange, json: bool) -> Result<()> {
    debug!(%range, json, "listing dev servers");

    let processes = match discover(range).await {
        Ok(processes) => processes,
        Err(Error::PermissionDenied(_)) => {
            output::error("Permission denied. Try running with sudo.");
            std::process::exit(1);
        }
        Err(e) => {
            output::error(&format!("Failed to list processes: {e}"));
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&processes)?);
        return Ok(());
    }

    print!("{}", output::format_table(&processes, range));
    Ok(())
}

async fn discover(range: ScanRange) -> devkill_core::Result<Vec<ProcessInfo>> {
    let entries = PortScanner::new(range).scan().await?;
    enrich(entries).await
}
