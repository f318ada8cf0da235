//! Scan range configuration.
//!
//! Dev servers conventionally bind somewhere in 3000-9000; discovery only
//! reports listeners inside the configured range. Nothing is persisted.

use serde::{Deserialize, Serialize};

/// Default lower bound for the port scan.
pub const DEFAULT_MIN_PORT: u16 = 3000;

/// Default upper bound for the port scan.
pub const DEFAULT_MAX_PORT: u16 = 9000;

/// Inclusive port range to scan for listening dev servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
    /// Lowest port included in the scan.
    pub min: u16,

    /// Highest port included in the scan.
    pub max: u16,
}

impl ScanRange {
    /// Create a range, swapping the bounds if they are reversed.
    pub fn new(min: u16, max: u16) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether a port falls inside this range.
    pub fn contains(&self, port: u16) -> bool {
        port >= self.min && port <= self.max
    }
}

impl Default for ScanRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_PORT,
            max: DEFAULT_MAX_PORT,
        }
    }
}

impl std::fmt::Display for ScanRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\u{2013}{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let range = ScanRange::default();
        assert_eq!(range.min, 3000);
        assert_eq!(range.max, 9000);
    }

    #[test]
    fn test_contains() {
        let range = ScanRange::default();
        assert!(range.contains(3000));
        assert!(range.contains(9000));
        assert!(range.contains(5173));
        assert!(!range.contains(2999));
        assert!(!range.contains(9001));
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let range = ScanRange::new(9000, 3000);
        assert_eq!(range.min, 3000);
        assert_eq!(range.max, 9000);
    }

    #[test]
    fn test_display() {
        assert_eq!(ScanRange::default().to_string(), "3000\u{2013}9000");
    }
}
