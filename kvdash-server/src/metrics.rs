//! # Request Metrics
//!
//! Provide lightweight counters behind the `Stats` operation.
//!
//! ## Design Principles
//!
//! 1. **Accumulator Pattern**: atomic counters aggregate events cheaply on
//!    the request path.
//! 2. **Zero-Cost Snapshots**: snapshots are plain structs with no locks on
//!    the read side.
//!
//! `Ordering::Relaxed` is sufficient: the fields are independent and a
//! snapshot only needs eventual consistency.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time view of the request counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Total number of requests accepted.
    pub requests_total: u64,
    /// Total number of requests that ended in an error.
    pub errors_total: u64,
    /// Requests currently in flight.
    pub inflight: u64,
}

/// Thread-safe request counters for the server.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    errors_total: AtomicU64,
    inflight: AtomicU64,
}

impl Metrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted request.
    pub fn record_request_start(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.inflight.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a finished request.
    pub fn record_request_end(&self) {
        self.inflight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Records a failed request.
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
            inflight: self.inflight.load(Ordering::Relaxed),
        }
    }
}
