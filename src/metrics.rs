// Export metrics
//
// Counts export targets and time spent exporting for the end-of-run summary

use crate::models::{BatchReport, TargetStatus};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for one run of the exporter.
#[derive(Debug)]
pub struct ExportMetrics {
    /// Targets written successfully
    pub targets_exported: AtomicUsize,

    /// Targets that failed
    pub targets_failed: AtomicUsize,

    /// Targets not requested or not attempted
    pub targets_skipped: AtomicUsize,

    /// Time spent inside export operations, in milliseconds
    pub total_export_time_ms: AtomicU64,

    /// Time spent loading saves, in milliseconds
    pub load_time_ms: AtomicU64,

    start_time: Instant,
}

impl ExportMetrics {
    pub fn new() -> Self {
        Self {
            targets_exported: AtomicUsize::new(0),
            targets_failed: AtomicUsize::new(0),
            targets_skipped: AtomicUsize::new(0),
            total_export_time_ms: AtomicU64::new(0),
            load_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_exported(&self, duration: Duration) {
        self.targets_exported.fetch_add(1, Ordering::Relaxed);
        self.record_export_time(duration);
    }

    pub fn record_failed(&self, duration: Duration) {
        self.targets_failed.fetch_add(1, Ordering::Relaxed);
        self.record_export_time(duration);
    }

    pub fn record_skipped(&self) {
        self.targets_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_time(&self, duration: Duration) {
        self.load_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    fn record_export_time(&self, duration: Duration) {
        self.total_export_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Fold every outcome of a batch into the counters.
    pub fn record_report(&self, report: &BatchReport) {
        for outcome in &report.outcomes {
            match outcome.status {
                TargetStatus::Exported => self.record_exported(outcome.duration),
                TargetStatus::Failed(_) => self.record_failed(outcome.duration),
                TargetStatus::Skipped => self.record_skipped(),
            }
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average export time per attempted target in milliseconds
    pub fn avg_export_time_ms(&self) -> f64 {
        let total = self.total_export_time_ms.load(Ordering::Relaxed);
        let count = self.targets_exported.load(Ordering::Relaxed)
            + self.targets_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::debug!(
            "Targets: {} exported, {} failed, {} skipped",
            self.targets_exported.load(Ordering::Relaxed),
            self.targets_failed.load(Ordering::Relaxed),
            self.targets_skipped.load(Ordering::Relaxed)
        );
        tracing::debug!(
            "Load time: {:.2}s, export time: {:.2}s (avg: {:.2}ms per target), total: {:.2}s",
            self.load_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.total_export_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_export_time_ms(),
            self.uptime().as_secs_f64()
        );
    }
}

impl Default for ExportMetrics {
    fn default() -> Self {
        Self::new()
    }
}
