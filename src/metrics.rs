use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

/// Per-session cycle counters.
#[derive(Debug)]
pub struct SessionMetrics {
    cycles_dispatched: AtomicU64,
    cycles_applied: AtomicU64,
    cycles_failed: AtomicU64,
    cycles_stale: AtomicU64,
    started: Instant,
}

/// Point-in-time copy of [`SessionMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub cycles_dispatched: u64,
    pub cycles_applied: u64,
    pub cycles_failed: u64,
    pub cycles_stale: u64,
    pub uptime_secs: u64,
}

impl SessionSummary {
    /// Cycles dispatched but not yet resolved.
    pub fn in_flight(&self) -> u64 {
        self.cycles_dispatched
            .saturating_sub(self.cycles_applied + self.cycles_failed + self.cycles_stale)
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            cycles_dispatched: AtomicU64::new(0),
            cycles_applied: AtomicU64::new(0),
            cycles_failed: AtomicU64::new(0),
            cycles_stale: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn record_dispatched(&self) {
        self.cycles_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        self.cycles_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.cycles_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            cycles_dispatched: self.cycles_dispatched.load(Ordering::Relaxed),
            cycles_applied: self.cycles_applied.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            cycles_stale: self.cycles_stale.load(Ordering::Relaxed),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }

    pub fn log_summary(&self) {
        let s = self.summary();
        info!(
            cycles_dispatched = s.cycles_dispatched,
            cycles_applied = s.cycles_applied,
            cycles_failed = s.cycles_failed,
            cycles_stale = s.cycles_stale,
            uptime_secs = s.uptime_secs,
            "What-if session metrics"
        );
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.summary()).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_in_flight() {
        let metrics = SessionMetrics::new();
        for _ in 0..4 {
            metrics.record_dispatched();
        }
        metrics.record_applied();
        metrics.record_failed();

        let s = metrics.summary();
        assert_eq!(s.cycles_dispatched, 4);
        assert_eq!(s.in_flight(), 2);
        assert_eq!(metrics.to_json()["cycles_failed"], 1);
    }
}
