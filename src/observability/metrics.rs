//! Counters for block value handling
//!
//! - Counters only
//! - Monotonic increase
//! - Lock-free increments

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of operational counters.
///
/// All counters use Relaxed atomics; values are exact once the owning
/// operation has returned.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    batches_committed: AtomicU64,
    batches_rejected: AtomicU64,
    orphans_collected: AtomicU64,
    blocks_inserted: AtomicU64,
    blocks_removed: AtomicU64,
    exposure_rows_expanded: AtomicU64,
    exposure_rows_collapsed: AtomicU64,
    records_collapsed: AtomicU64,
    projections: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_batches_committed(&self) {
        self.batches_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_batches_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_orphans_collected(&self, count: u64) {
        self.orphans_collected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_blocks_inserted(&self) {
        self.blocks_inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_blocks_removed(&self) {
        self.blocks_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_exposure_rows_expanded(&self, count: u64) {
        self.exposure_rows_expanded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_exposure_rows_collapsed(&self, count: u64) {
        self.exposure_rows_collapsed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_records_collapsed(&self, count: u64) {
        self.records_collapsed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_projections(&self) {
        self.projections.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_committed: self.batches_committed.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            orphans_collected: self.orphans_collected.load(Ordering::Relaxed),
            blocks_inserted: self.blocks_inserted.load(Ordering::Relaxed),
            blocks_removed: self.blocks_removed.load(Ordering::Relaxed),
            exposure_rows_expanded: self.exposure_rows_expanded.load(Ordering::Relaxed),
            exposure_rows_collapsed: self.exposure_rows_collapsed.load(Ordering::Relaxed),
            records_collapsed: self.records_collapsed.load(Ordering::Relaxed),
            projections: self.projections.load(Ordering::Relaxed),
        }
    }

    /// Snapshot as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub batches_committed: u64,
    pub batches_rejected: u64,
    pub orphans_collected: u64,
    pub blocks_inserted: u64,
    pub blocks_removed: u64,
    pub exposure_rows_expanded: u64,
    pub exposure_rows_collapsed: u64,
    pub records_collapsed: u64,
    pub projections: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.batches_committed, 0);
        assert_eq!(snapshot.orphans_collected, 0);
        assert_eq!(snapshot.projections, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_batches_committed();
        registry.increment_batches_committed();
        registry.increment_batches_rejected();
        registry.add_orphans_collected(3);
        registry.add_exposure_rows_expanded(2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.batches_committed, 2);
        assert_eq!(snapshot.batches_rejected, 1);
        assert_eq!(snapshot.orphans_collected, 3);
        assert_eq!(snapshot.exposure_rows_expanded, 2);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_projections();
        let json = registry.to_json();
        assert_eq!(json["projections"], 1);
        assert_eq!(json["blocks_inserted"], 0);
    }
}
