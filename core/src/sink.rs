//! Tracing-backed event sink
//!
//! Renders the four event kinds as structured tracing records on dedicated
//! targets (`websim::traffic`, `websim::security`, `websim::compromise`,
//! `websim::stats`), so downstream collectors can filter per stream the way
//! the original tool split its log files.

use crate::event::{CompromiseEvent, SecurityEvent, SummaryMap, TrafficEvent};
use crate::traits::EventSink;
use uuid::Uuid;

/// EventSink emitting structured tracing records, one target per event kind.
#[derive(Debug, Clone)]
pub struct TracingEventSink {
    run_id: Uuid,
}

impl TracingEventSink {
    /// Create a sink stamping every record with the given run id
    pub fn new(run_id: Uuid) -> Self {
        Self { run_id }
    }
}

impl EventSink for TracingEventSink {
    fn traffic(&self, event: TrafficEvent) {
        tracing::info!(
            target: "websim::traffic",
            session = %self.run_id,
            method = %event.method,
            url = %event.target,
            status = event.status.map(i64::from).unwrap_or(-1),
            latency_ms = format_args!("{:.1}", event.latency_ms),
            class = %event.classification,
            "request"
        );
    }

    fn security(&self, event: SecurityEvent) {
        tracing::warn!(
            target: "websim::security",
            session = %self.run_id,
            kind = %event.kind,
            severity = %event.severity,
            indicators = ?event.indicators,
            "{}",
            event.description
        );
    }

    fn compromise(&self, event: CompromiseEvent) {
        let status = if event.success { "success" } else { "attempt" };
        tracing::warn!(
            target: "websim::compromise",
            session = %self.run_id,
            activity = %event.behavior,
            target_host = %event.target,
            payload_hash = %event.payload_fingerprint,
            status = status,
            "compromise activity"
        );
    }

    fn summary(&self, summary: &SummaryMap) {
        let rendered = serde_json::to_string(summary).unwrap_or_default();
        tracing::info!(
            target: "websim::stats",
            session = %self.run_id,
            stats = %rendered,
            "run statistics"
        );
    }
}
