//! Core traits for transports, destination data, and event sinks
//!
//! These traits are defined in core to keep the scheduler decoupled from any
//! concrete HTTP client or literal data table. Implementations live in their
//! respective crates (transports/, data/).

use crate::event::{CompromiseEvent, SecurityEvent, SummaryMap, TrafficEvent};
use async_trait::async_trait;
use rand::RngCore;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Transport
// ============================================================================

/// Result of one transport-level request
#[derive(Debug, Clone, Copy)]
pub struct FetchMetrics {
    /// HTTP status code of the response
    pub status: u16,
    /// Wall-clock time the request took
    pub elapsed: Duration,
}

impl FetchMetrics {
    /// Whether the response status indicates success (< 400)
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Narrow transport surface the core depends on.
///
/// Implementations may be a real HTTP client, browser automation, or a no-op
/// test double; the core never sees anything beyond these two calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET-style visit to a target URL
    async fn visit(&self, target: &str) -> Result<FetchMetrics, TransportError>;

    /// Issue a request with a method and payload body
    async fn submit(
        &self,
        target: &str,
        method: &str,
        payload: &str,
    ) -> Result<FetchMetrics, TransportError>;
}

/// Transport-level errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP/network error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Target URL was malformed or unsupported
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Unsupported HTTP method string
    #[error("invalid method: {0}")]
    InvalidMethod(String),
}

// ============================================================================
// Destination data source
// ============================================================================

/// One attack-pattern definition: a payload plus the field it targets.
#[derive(Debug, Clone)]
pub struct AttackPattern {
    /// Pattern name, e.g. `sql_injection`
    pub name: String,
    /// The literal payload string
    pub payload: String,
    /// Name of the query field the payload is delivered through
    pub field: String,
}

/// One compromised-host behavior definition.
#[derive(Debug, Clone)]
pub struct CompromiseBehavior {
    /// Behavior name, e.g. `credential_theft`
    pub name: String,
    /// Target of the behavior (a site, a C2 domain, an internal path)
    pub target: String,
    /// HTTP method a live send would use
    pub method: String,
    /// Indicator keyword associated with the behavior
    pub indicator: String,
}

/// Provider of destinations and attack/behavior definitions.
///
/// The core treats this as an opaque, on-demand provider; it never owns or
/// enumerates the underlying data. All selection randomness comes from the
/// injected generator so runs stay reproducible.
pub trait TargetSource: Send + Sync {
    /// One randomly selected benign destination URL
    fn benign_target(&self, rng: &mut dyn RngCore) -> String;

    /// One randomly selected malicious destination URL
    fn malicious_target(&self, rng: &mut dyn RngCore) -> String;

    /// One attack-pattern definition
    fn attack_pattern(&self, rng: &mut dyn RngCore) -> AttackPattern;

    /// One compromised-host behavior definition
    fn compromise_behavior(&self, rng: &mut dyn RngCore) -> CompromiseBehavior;
}

// ============================================================================
// Event sink
// ============================================================================

/// Append-only sink for the four event kinds the core emits.
///
/// Fire-and-forget: implementations must not block the caller for long and
/// must not silently drop events; buffering and back-pressure are the sink's
/// concern.
pub trait EventSink: Send + Sync {
    /// One issued (or attempted) request
    fn traffic(&self, event: TrafficEvent);

    /// One simulated security event
    fn security(&self, event: SecurityEvent);

    /// One compromised-host activity record
    fn compromise(&self, event: CompromiseEvent);

    /// The final run summary; emitted exactly once per run
    fn summary(&self, summary: &SummaryMap);
}
