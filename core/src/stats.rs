//! Run statistics aggregation
//!
//! The aggregator is the only state shared by concurrently running sessions.
//! Counters are lock-free atomics updated once per completed session; the
//! transport-latency histogram sits behind a mutex that is only touched at
//! session completion, never on the per-request hot path.

use crate::event::SummaryMap;
use crate::session::SessionOutcome;
use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thread-safe run statistics aggregator
pub struct StatsAggregator {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    security_events: AtomicU64,
    compromise_activities: AtomicU64,
    latencies: Mutex<Histogram<u64>>,
    started_at: DateTime<Utc>,
    started_instant: Instant,
}

impl StatsAggregator {
    /// Create a fresh aggregator; the run's start time is now
    pub fn new() -> Self {
        // Microsecond precision, one hour ceiling
        let histogram = Histogram::new_with_bounds(1, 3_600_000_000, 3)
            .expect("histogram bounds are static and valid");
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            security_events: AtomicU64::new(0),
            compromise_activities: AtomicU64::new(0),
            latencies: Mutex::new(histogram),
            started_at: Utc::now(),
            started_instant: Instant::now(),
        }
    }

    /// Record one completed session.
    ///
    /// Applied exactly once per work item, by whichever worker finished it.
    pub fn record_outcome(&self, outcome: &SessionOutcome) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if outcome.success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
        self.security_events
            .fetch_add(outcome.security_events(), Ordering::Relaxed);
        self.compromise_activities
            .fetch_add(outcome.compromise_activities(), Ordering::Relaxed);

        let mut histogram = self.latencies.lock().expect("latency histogram poisoned");
        for latency in outcome.transport_latencies() {
            let _ = histogram.record(latency.as_micros() as u64);
        }
    }

    /// Read a consistent-enough snapshot for reporting.
    pub fn snapshot(&self) -> RunStats {
        let histogram = self.latencies.lock().expect("latency histogram poisoned");
        let (p50, p95, p99) = if histogram.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                histogram.value_at_quantile(0.50) as f64 / 1_000.0,
                histogram.value_at_quantile(0.95) as f64 / 1_000.0,
                histogram.value_at_quantile(0.99) as f64 / 1_000.0,
            )
        };

        RunStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            security_events: self.security_events.load(Ordering::Relaxed),
            compromise_activities: self.compromise_activities.load(Ordering::Relaxed),
            started_at: self.started_at,
            elapsed: self.started_instant.elapsed(),
            latency_p50_ms: p50,
            latency_p95_ms: p95,
            latency_p99_ms: p99,
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator")
            .field("total_requests", &self.total_requests.load(Ordering::Relaxed))
            .field(
                "successful_requests",
                &self.successful_requests.load(Ordering::Relaxed),
            )
            .field(
                "failed_requests",
                &self.failed_requests.load(Ordering::Relaxed),
            )
            .finish()
    }
}

/// Snapshot of the run's counters and derived metrics
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Sessions dispatched and completed (success or failure)
    pub total_requests: u64,
    /// Sessions that completed successfully
    pub successful_requests: u64,
    /// Sessions that failed
    pub failed_requests: u64,
    /// Security events raised
    pub security_events: u64,
    /// Compromised-host activities recorded
    pub compromise_activities: u64,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Elapsed time at snapshot
    pub elapsed: Duration,
    /// Median transport latency, milliseconds
    pub latency_p50_ms: f64,
    /// 95th percentile transport latency, milliseconds
    pub latency_p95_ms: f64,
    /// 99th percentile transport latency, milliseconds
    pub latency_p99_ms: f64,
}

impl RunStats {
    /// Success rate in percent (0.0 when nothing ran)
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64 * 100.0
        }
    }

    /// Achieved sessions per minute
    pub fn requests_per_minute(&self) -> f64 {
        let minutes = self.elapsed.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.total_requests as f64 / minutes
        } else {
            0.0
        }
    }

    /// Render the flat key/value map carried by the summary event
    pub fn to_summary(&self) -> SummaryMap {
        let mut summary = SummaryMap::new();
        summary.insert("total_requests".into(), self.total_requests.to_string());
        summary.insert(
            "successful_requests".into(),
            self.successful_requests.to_string(),
        );
        summary.insert("failed_requests".into(), self.failed_requests.to_string());
        summary.insert("security_events".into(), self.security_events.to_string());
        summary.insert(
            "compromise_activities".into(),
            self.compromise_activities.to_string(),
        );
        summary.insert("start_time".into(), self.started_at.to_rfc3339());
        summary.insert(
            "duration_minutes".into(),
            format!("{:.2}", self.elapsed.as_secs_f64() / 60.0),
        );
        summary.insert(
            "requests_per_minute".into(),
            format!("{:.2}", self.requests_per_minute()),
        );
        summary.insert("success_rate".into(), format!("{:.2}", self.success_rate()));
        summary.insert(
            "latency_p50_ms".into(),
            format!("{:.2}", self.latency_p50_ms),
        );
        summary.insert(
            "latency_p95_ms".into(),
            format!("{:.2}", self.latency_p95_ms),
        );
        summary.insert(
            "latency_p99_ms".into(),
            format!("{:.2}", self.latency_p99_ms),
        );
        summary
    }
}
