//! Controller metrics
//!
//! Counters are monotonic. `response_time_ms` holds the latest sample only (no
//! rolling average) and is reset by recovery. `accuracy` and `uptime_seconds`
//! are derived values refreshed by their readers.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::models::ThreatLevel;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerMetrics {
    pub response_time_ms: f64,
    pub accuracy: f64,
    pub uptime_seconds: f64,
    pub processed_operations: u64,
    pub errors_count: u64,
    pub threats_neutralized: u64,
}

#[derive(Debug)]
pub struct MetricsTracker {
    metrics: ControllerMetrics,
    started_at: Instant,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            metrics: ControllerMetrics::default(),
            started_at: Instant::now(),
        }
    }

    pub fn record_processed(&mut self, elapsed: Duration, threat: ThreatLevel) {
        self.metrics.processed_operations += 1;
        self.metrics.response_time_ms = elapsed.as_secs_f64() * 1000.0;
        if threat.is_significant() {
            self.metrics.threats_neutralized += 1;
        }
    }

    pub fn record_error(&mut self) {
        self.metrics.errors_count += 1;
    }

    pub fn reset_response_time(&mut self) {
        self.metrics.response_time_ms = 0.0;
    }

    /// `1 - errors/processed`, clamped to `[0, 1]`. Left unchanged while nothing
    /// has been processed. Rejected operations raise `errors_count` without
    /// raising `processed_operations`, so the raw ratio can exceed 1.
    pub fn refresh_accuracy(&mut self) -> f64 {
        let processed = self.metrics.processed_operations;
        if processed > 0 {
            let error_rate = self.metrics.errors_count as f64 / processed as f64;
            self.metrics.accuracy = (1.0 - error_rate).clamp(0.0, 1.0);
        }
        self.metrics.accuracy
    }

    pub fn refresh_uptime(&mut self) -> f64 {
        self.metrics.uptime_seconds = self.started_at.elapsed().as_secs_f64();
        self.metrics.uptime_seconds
    }

    pub fn meets_accuracy_target(&self, min_accuracy: f64) -> bool {
        self.metrics.accuracy >= min_accuracy
    }

    pub fn response_time_ms(&self) -> f64 {
        self.metrics.response_time_ms
    }

    pub fn snapshot(&self) -> ControllerMetrics {
        self.metrics.clone()
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}
