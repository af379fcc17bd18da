//! Relay counters.
//!
//! Thread-safe observability counters for the forwarding paths.
//!
//! Uses atomic counters so the three tasks can record without coordination.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

/// Counters shared by the controller and both workers.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Datagrams forwarded toward the flight controller
    pub to_fc_datagrams: AtomicU64,
    /// Bytes forwarded toward the flight controller
    pub to_fc_bytes: AtomicU64,
    /// Datagrams forwarded toward the GCS
    pub to_gcs_datagrams: AtomicU64,
    /// Bytes forwarded toward the GCS
    pub to_gcs_bytes: AtomicU64,
    /// Zero-length receipts, all endpoints
    pub empty_receipts: AtomicU64,
    /// GCS-in receipts consumed after activation without being forwarded
    pub inert_receipts: AtomicU64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one datagram forwarded to the flight controller.
    pub fn record_to_fc(&self, bytes: usize) {
        self.to_fc_datagrams.fetch_add(1, Ordering::Relaxed);
        self.to_fc_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record one datagram forwarded to the GCS.
    pub fn record_to_gcs(&self, bytes: usize) {
        self.to_gcs_datagrams.fetch_add(1, Ordering::Relaxed);
        self.to_gcs_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_empty(&self) {
        self.empty_receipts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inert(&self) {
        self.inert_receipts.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit a one-line summary of all counters.
    pub fn log_summary(&self) {
        info!(
            to_fc_datagrams = self.to_fc_datagrams.load(Ordering::Relaxed),
            to_fc_bytes = self.to_fc_bytes.load(Ordering::Relaxed),
            to_gcs_datagrams = self.to_gcs_datagrams.load(Ordering::Relaxed),
            to_gcs_bytes = self.to_gcs_bytes.load(Ordering::Relaxed),
            empty_receipts = self.empty_receipts.load(Ordering::Relaxed),
            inert_receipts = self.inert_receipts.load(Ordering::Relaxed),
            "relay metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = RelayMetrics::new();
        metrics.record_to_fc(10);
        metrics.record_to_fc(22);
        metrics.record_to_gcs(7);
        metrics.record_empty();
        metrics.record_inert();

        assert_eq!(metrics.to_fc_datagrams.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.to_fc_bytes.load(Ordering::Relaxed), 32);
        assert_eq!(metrics.to_gcs_datagrams.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.to_gcs_bytes.load(Ordering::Relaxed), 7);
        assert_eq!(metrics.empty_receipts.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.inert_receipts.load(Ordering::Relaxed), 1);
    }
}
