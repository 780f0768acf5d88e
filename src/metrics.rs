use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing intake activity.
#[derive(Default)]
pub struct IntakeMetrics {
    events_received: AtomicU64,
    records_written: AtomicU64,
    failures: AtomicU64,
    entities_extracted: AtomicU64,
}

impl IntakeMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an incoming storage event before any processing happens.
    pub fn record_event(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a persisted document and the number of entities it carried.
    pub fn record_written(&self, entity_count: u64) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.entities_extracted
            .fetch_add(entity_count, Ordering::Relaxed);
    }

    /// Record an event that ended without a write.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            entities_extracted: self.entities_extracted.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of intake counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Storage events received since startup.
    pub events_received: u64,
    /// Records written to the document database.
    pub records_written: u64,
    /// Events dropped because analysis or persistence failed.
    pub failures: u64,
    /// Total entities persisted across all records.
    pub entities_extracted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_writes_and_entities() {
        let metrics = IntakeMetrics::new();
        metrics.record_event();
        metrics.record_written(2);
        metrics.record_event();
        metrics.record_written(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_received, 2);
        assert_eq!(snapshot.records_written, 2);
        assert_eq!(snapshot.entities_extracted, 5);
        assert_eq!(snapshot.failures, 0);
    }

    #[test]
    fn failures_do_not_touch_write_counters() {
        let metrics = IntakeMetrics::new();
        metrics.record_event();
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_received, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.records_written, 0);
    }
}
