//! Client-side counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording operation and download outcomes
#[derive(Debug, Default)]
pub struct Metrics {
    operations_submitted: AtomicU64,
    operations_rejected: AtomicU64,
    operations_succeeded: AtomicU64,
    operations_failed: AtomicU64,
    artifacts_saved: AtomicU64,
    downloads_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_submitted(&self) {
        self.operations_submitted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "operations_submitted", "Metric incremented");
    }

    /// Submit refused because an attempt was already in flight
    pub fn operation_rejected(&self) {
        self.operations_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "operations_rejected", "Metric incremented");
    }

    pub fn operation_succeeded(&self) {
        self.operations_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "operations_succeeded", "Metric incremented");
    }

    pub fn operation_failed(&self) {
        self.operations_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "operations_failed", "Metric incremented");
    }

    pub fn artifact_saved(&self) {
        self.artifacts_saved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "artifacts_saved", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            operations_submitted: self.operations_submitted.load(Ordering::Relaxed),
            operations_rejected: self.operations_rejected.load(Ordering::Relaxed),
            operations_succeeded: self.operations_succeeded.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
            artifacts_saved: self.artifacts_saved.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub operations_submitted: u64,
    pub operations_rejected: u64,
    pub operations_succeeded: u64,
    pub operations_failed: u64,
    pub artifacts_saved: u64,
    pub downloads_failed: u64,
}
