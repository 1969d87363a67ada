//! # Traversal Limits
//!
//! Page-size bounds consumed by the scanner and materializer. Read once at
//! startup and passed in explicitly, so the core stays testable in
//! isolation.

use serde::Deserialize;

/// Bounds on how much data one operation may pull from the store.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Limits {
    /// `COUNT` hint sent with every scan request.
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
    /// Maximum rows fetched from a list value; the rest is truncated.
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            scan_count: default_scan_count(),
            row_limit: default_row_limit(),
        }
    }
}

fn default_scan_count() -> usize {
    500
}

fn default_row_limit() -> usize {
    1000
}
