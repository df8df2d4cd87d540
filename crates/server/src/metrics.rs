//! Server metrics
//!
//! Atomic counters for tracking decode requests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Listener metrics
#[derive(Debug, Default)]
pub struct ServerMetrics {
    /// Total decode requests received
    pub requests_received: AtomicU64,

    /// Requests answered with 200
    pub requests_success: AtomicU64,

    /// Client errors (4xx)
    pub client_errors: AtomicU64,

    /// Server errors (5xx)
    pub server_errors: AtomicU64,

    /// Records written back across all requests
    pub records_decoded: AtomicU64,

    /// Payloads whose record stream ended in a fault
    pub corrupt_payloads: AtomicU64,

    /// Raw body bytes received
    pub bytes_received: AtomicU64,
}

impl ServerMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            requests_success: AtomicU64::new(0),
            client_errors: AtomicU64::new(0),
            server_errors: AtomicU64::new(0),
            records_decoded: AtomicU64::new(0),
            corrupt_payloads: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn request_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn bytes_received(&self, bytes: usize) {
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a 200 response carrying `records` documents
    #[inline]
    pub fn request_success(&self, records: usize) {
        self.requests_success.fetch_add(1, Ordering::Relaxed);
        self.records_decoded.fetch_add(records as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn client_error(&self) {
        self.client_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn server_error(&self) {
        self.server_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn corrupt_payload(&self) {
        self.corrupt_payloads.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            corrupt_payloads: self.corrupt_payloads.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_received: u64,
    pub requests_success: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub records_decoded: u64,
    pub corrupt_payloads: u64,
    pub bytes_received: u64,
}
