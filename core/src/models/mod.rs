//! Data models for discovered ports and enriched processes.

mod framework;
mod port_entry;
mod process_info;

pub use framework::detect_framework;
pub use port_entry::PortEntry;
pub use process_info::ProcessInfo;
