//! Writer metrics.
//!
//! Steady-state failures (queue overflow, encode or send failures) never
//! reach the caller as errors; these counters are how they stay observable.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the writer and its worker.
#[derive(Debug, Default)]
pub struct WriterMetrics {
    /// Records accepted into the pending queue
    pub records_submitted: AtomicU64,

    /// Records dropped because the queue was at capacity
    pub records_dropped: AtomicU64,

    /// Batches transmitted successfully
    pub batches_sent: AtomicU64,

    /// Records contained in successfully transmitted batches
    pub records_sent: AtomicU64,

    /// Batches dropped after an encode or transmission failure
    pub batches_failed: AtomicU64,
}

impl WriterMetrics {
    /// Create a new metrics instance
    pub const fn new() -> Self {
        Self {
            records_submitted: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            records_sent: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
        }
    }

    /// Record an accepted submission
    #[inline]
    pub fn record_submitted(&self) {
        self.records_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a capacity drop
    #[inline]
    pub fn record_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successfully transmitted batch
    #[inline]
    pub fn record_sent(&self, record_count: u64) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.records_sent.fetch_add(record_count, Ordering::Relaxed);
    }

    /// Record a dropped batch
    #[inline]
    pub fn record_failed(&self) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_submitted: self.records_submitted.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            records_sent: self.records_sent.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of writer metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_submitted: u64,
    pub records_dropped: u64,
    pub batches_sent: u64,
    pub records_sent: u64,
    pub batches_failed: u64,
}
