//! Event types carried through the [`EventSink`](crate::traits::EventSink)
//!
//! Four event kinds flow out of the core: per-request traffic records,
//! security events, compromised-host activity records, and the single
//! end-of-run summary. Events are fire-and-forget from the core's
//! perspective; buffering and persistence are the sink's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Severity attached to security events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Low,
    /// Suspicious but not conclusive
    Medium,
    /// Simulated attack or compromise indicator
    High,
}

impl Severity {
    /// Stable lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issued (or attempted) request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficEvent {
    /// HTTP method
    pub method: String,
    /// Destination URL
    pub target: String,
    /// Response status, absent when the request failed at transport level
    pub status: Option<u16>,
    /// Wall-clock latency of the request in milliseconds
    pub latency_ms: f64,
    /// Behavior-class label of the owning session
    pub classification: String,
    /// When the request completed
    pub timestamp: DateTime<Utc>,
}

/// A detected (simulated) security event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Event kind, e.g. `sql_injection`
    pub kind: String,
    /// Human-readable description
    pub description: String,
    /// Severity classification
    pub severity: Severity,
    /// Free-form indicator map (target field, payload, URL, ...)
    pub indicators: HashMap<String, String>,
    /// When the event was raised
    pub timestamp: DateTime<Utc>,
}

/// One compromised-host activity record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompromiseEvent {
    /// Behavior name, e.g. `c2_communication`
    pub behavior: String,
    /// Target of the activity
    pub target: String,
    /// Short fingerprint of the synthesized payload
    pub payload_fingerprint: String,
    /// Whether the activity was actually carried out (always false in
    /// dry-run mode; live sends report the transport result)
    pub success: bool,
    /// When the activity was recorded
    pub timestamp: DateTime<Utc>,
}

/// Flat key/value map carried by the end-of-run summary event.
///
/// Ordered so the summary renders deterministically.
pub type SummaryMap = BTreeMap<String, String>;

/// Short stable fingerprint of a payload string.
///
/// Deliberately not cryptographic: the fingerprint only has to correlate log
/// lines, never to protect anything.
pub fn payload_fingerprint(payload: &str) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    payload.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
