//! Message bundle load metrics.
//!
//! Counts bundle load attempts and failures so a degraded locale (rendering
//! with an empty bundle) shows up in `/api/health` instead of only in logs.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global message load metrics singleton.
pub struct LoadMetrics {
    /// Number of bundle load attempts
    loads: AtomicUsize,

    /// Number of attempts that fell back to an empty bundle
    failures: AtomicUsize,
}

static METRICS: OnceLock<LoadMetrics> = OnceLock::new();

impl LoadMetrics {
    pub fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// Get the global load metrics instance.
    pub fn global() -> &'static LoadMetrics {
        METRICS.get_or_init(LoadMetrics::new)
    }

    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> LoadReport {
        let loads = self.loads();
        let failures = self.failures().min(loads);
        let success_rate = if loads > 0 {
            ((loads - failures) as f64 / loads as f64) * 100.0
        } else {
            100.0
        };

        LoadReport {
            loads,
            failures,
            success_rate,
        }
    }
}

impl Default for LoadMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the load counters.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub loads: usize,
    pub failures: usize,

    /// Percentage of loads that produced a real bundle (0-100)
    pub success_rate: f64,
}
