//! Operation counters
//!
//! - Counters only, monotonic
//! - Thread-safe, relaxed ordering

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for mapper operations
#[derive(Debug, Default)]
pub struct OrmMetrics {
    /// Successful saves
    saves: AtomicU64,
    /// Successful reads
    reads: AtomicU64,
    /// Successful updates
    updates: AtomicU64,
    /// Successful deletes
    deletes: AtomicU64,
    /// Writes rejected for a stale revision
    conflicts: AtomicU64,
    /// Operations rejected before reaching the store
    rejected: AtomicU64,
}

impl OrmMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_saves(&self) {
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reads(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updates(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_conflicts(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            saves: self.saves.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub saves: u64,
    pub reads: u64,
    pub updates: u64,
    pub deletes: u64,
    pub conflicts: u64,
    pub rejected: u64,
}
