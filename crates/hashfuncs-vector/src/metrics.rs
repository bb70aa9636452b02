//! Process-wide hashing counters.
//!
//! All counters are monotonically increasing relaxed atomics. They are
//! observational only and never influence digests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global hashing counters.
pub struct HashMetrics {
    pub batches_total: AtomicU64,
    pub rows_total: AtomicU64,
    pub null_rows_total: AtomicU64,
    pub parallel_batches_total: AtomicU64,
    pub rejected_batches_total: AtomicU64,
}

impl HashMetrics {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            batches_total: AtomicU64::new(0),
            rows_total: AtomicU64::new(0),
            null_rows_total: AtomicU64::new(0),
            parallel_batches_total: AtomicU64::new(0),
            rejected_batches_total: AtomicU64::new(0),
        }
    }

    /// Record one completed batch.
    pub fn record_batch(&self, rows: usize, null_rows: usize, parallel: bool) {
        self.batches_total.fetch_add(1, Ordering::Relaxed);
        self.rows_total.fetch_add(rows as u64, Ordering::Relaxed);
        self.null_rows_total
            .fetch_add(null_rows as u64, Ordering::Relaxed);
        if parallel {
            self.parallel_batches_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a batch that failed before any row was hashed.
    pub fn record_rejected(&self) {
        self.rejected_batches_total.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> HashMetricsSnapshot {
        HashMetricsSnapshot {
            batches_total: self.batches_total.load(Ordering::Relaxed),
            rows_total: self.rows_total.load(Ordering::Relaxed),
            null_rows_total: self.null_rows_total.load(Ordering::Relaxed),
            parallel_batches_total: self.parallel_batches_total.load(Ordering::Relaxed),
            rejected_batches_total: self.rejected_batches_total.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.batches_total.store(0, Ordering::Relaxed);
        self.rows_total.store(0, Ordering::Relaxed);
        self.null_rows_total.store(0, Ordering::Relaxed);
        self.parallel_batches_total.store(0, Ordering::Relaxed);
        self.rejected_batches_total.store(0, Ordering::Relaxed);
    }
}

impl Default for HashMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`HashMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashMetricsSnapshot {
    pub batches_total: u64,
    pub rows_total: u64,
    pub null_rows_total: u64,
    pub parallel_batches_total: u64,
    pub rejected_batches_total: u64,
}

impl fmt::Display for HashMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HashMetrics {{ batches: {} ({} parallel, {} rejected), rows: {} ({} null) }}",
            self.batches_total,
            self.parallel_batches_total,
            self.rejected_batches_total,
            self.rows_total,
            self.null_rows_total,
        )
    }
}

/// Global hashing metrics singleton.
pub static GLOBAL_HASH_METRICS: HashMetrics = HashMetrics::new();

/// Snapshot of [`GLOBAL_HASH_METRICS`].
#[must_use]
pub fn hash_metrics_snapshot() -> HashMetricsSnapshot {
    GLOBAL_HASH_METRICS.snapshot()
}

/// Reset [`GLOBAL_HASH_METRICS`].
pub fn reset_hash_metrics() {
    GLOBAL_HASH_METRICS.reset();
}
