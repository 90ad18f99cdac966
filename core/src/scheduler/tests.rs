//! End-to-end scheduler scenarios
//!
//! These run whole multi-window generations against instant transport
//! doubles under tokio's paused clock, so 60-second windows cost no
//! wall-clock time.

use super::*;
use crate::cancel::CancelToken;
use crate::config::{BehaviorMix, RunConfig};
use crate::event::{CompromiseEvent, SecurityEvent, SummaryMap, TrafficEvent};
use crate::traits::{
    AttackPattern, CompromiseBehavior, EventSink, FetchMetrics, TargetSource, Transport,
    TransportError,
};
use async_trait::async_trait;
use rand::RngCore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Doubles
// ============================================================================

/// Instant transport double; optionally fails every Nth call.
struct ScriptedTransport {
    counter: AtomicUsize,
    fail_every: Option<usize>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            fail_every: None,
        }
    }

    fn with_fail_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n);
        self
    }

    fn calls(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    fn respond(&self) -> Result<FetchMetrics, TransportError> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(every) = self.fail_every {
            if count % every == 0 {
                return Err(TransportError::InvalidTarget("scripted failure".into()));
            }
        }
        Ok(FetchMetrics {
            status: 200,
            elapsed: Duration::from_millis(3),
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn visit(&self, _target: &str) -> Result<FetchMetrics, TransportError> {
        self.respond()
    }

    async fn submit(
        &self,
        _target: &str,
        _method: &str,
        _payload: &str,
    ) -> Result<FetchMetrics, TransportError> {
        self.respond()
    }
}

struct FixedTargets;

impl TargetSource for FixedTargets {
    fn benign_target(&self, _rng: &mut dyn RngCore) -> String {
        "https://example.com".into()
    }

    fn malicious_target(&self, _rng: &mut dyn RngCore) -> String {
        "http://malicious.example".into()
    }

    fn attack_pattern(&self, _rng: &mut dyn RngCore) -> AttackPattern {
        AttackPattern {
            name: "sql_injection".into(),
            payload: "' OR 1=1--".into(),
            field: "search".into(),
        }
    }

    fn compromise_behavior(&self, _rng: &mut dyn RngCore) -> CompromiseBehavior {
        CompromiseBehavior {
            name: "credential_theft".into(),
            target: "https://example.com".into(),
            method: "POST".into(),
            indicator: "password".into(),
        }
    }
}

/// Sink double counting events; can request cancellation after a set number
/// of traffic events to exercise the between-windows cancel path.
#[derive(Default)]
struct RecordingSink {
    traffic: AtomicUsize,
    security: AtomicUsize,
    compromise: AtomicUsize,
    summaries: AtomicUsize,
    last_summary: Mutex<Option<SummaryMap>>,
    cancel_after_traffic: Option<usize>,
    cancel: Mutex<Option<CancelToken>>,
}

impl RecordingSink {
    fn cancelling_after(count: usize) -> Self {
        Self {
            cancel_after_traffic: Some(count),
            ..Self::default()
        }
    }

    fn arm(&self, token: CancelToken) {
        *self.cancel.lock().unwrap() = Some(token);
    }
}

impl EventSink for RecordingSink {
    fn traffic(&self, _event: TrafficEvent) {
        let seen = self.traffic.fetch_add(1, Ordering::SeqCst) + 1;
        if Some(seen) == self.cancel_after_traffic {
            if let Some(token) = self.cancel.lock().unwrap().as_ref() {
                token.cancel();
            }
        }
    }

    fn security(&self, _event: SecurityEvent) {
        self.security.fetch_add(1, Ordering::SeqCst);
    }

    fn compromise(&self, _event: CompromiseEvent) {
        self.compromise.fetch_add(1, Ordering::SeqCst);
    }

    fn summary(&self, summary: &SummaryMap) {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        *self.last_summary.lock().unwrap() = Some(summary.clone());
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Two 60-second windows at 10 sessions per window, all normal class,
/// with dwell/interactions pinned to zero so each session is exactly one
/// transport call.
fn scenario_config() -> RunConfig {
    let mut config = RunConfig::default()
        .with_duration(Duration::from_secs(120))
        .with_requests_per_minute(10)
        .with_concurrency(5)
        .with_mix(BehaviorMix {
            normal: 1.0,
            compromised: 0.0,
            malicious: 0.0,
        })
        .with_seed(42);
    config.pacing.dwell_min_ms = 0;
    config.pacing.dwell_max_ms = 0;
    config.pacing.interactions_min = 0;
    config.pacing.interactions_max = 0;
    config.pacing.interaction_delay_min_ms = 0;
    config.pacing.interaction_delay_max_ms = 0;
    config
}

fn build(
    config: RunConfig,
    transport: Arc<ScriptedTransport>,
    sink: Arc<RecordingSink>,
) -> Scheduler {
    SchedulerBuilder::new()
        .config(config)
        .transport(transport)
        .targets(Arc::new(FixedTargets))
        .events(sink)
        .build()
        .expect("scheduler should build")
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_scenario_two_windows_all_normal() {
    let transport = Arc::new(ScriptedTransport::new());
    let sink = Arc::new(RecordingSink::default());
    let mut scheduler = build(scenario_config(), Arc::clone(&transport), Arc::clone(&sink));

    let start = tokio::time::Instant::now();
    let stats = scheduler.run().await.expect("run should succeed");

    // Exactly 2 windows of 10 normal sessions each
    assert_eq!(stats.total_requests, 20);
    assert_eq!(stats.successful_requests, 20);
    assert_eq!(stats.failed_requests, 0);
    assert_eq!(stats.security_events, 0);
    assert_eq!(stats.compromise_activities, 0);
    assert_eq!(transport.calls(), 20);
    assert_eq!(sink.traffic.load(Ordering::SeqCst), 20);
    // One summary, and the loop paced out the full two windows
    assert_eq!(sink.summaries.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() >= Duration::from_secs(120));
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_deterministic_transport_failures() {
    let transport = Arc::new(ScriptedTransport::new().with_fail_every(3));
    let sink = Arc::new(RecordingSink::default());
    let mut scheduler = build(scenario_config(), Arc::clone(&transport), Arc::clone(&sink));

    let stats = scheduler.run().await.expect("run should succeed");

    // 20 navigations, every 3rd one failing
    assert_eq!(stats.total_requests, 20);
    assert_eq!(stats.successful_requests + stats.failed_requests, 20);
    assert_eq!(stats.failed_requests, 20 / 3);
    let summary = sink.last_summary.lock().unwrap().clone().unwrap();
    assert_eq!(summary.get("failed_requests").unwrap(), "6");
}

#[tokio::test(start_paused = true)]
async fn test_scenario_cancellation_after_first_window() {
    let transport = Arc::new(ScriptedTransport::new());
    // The 10th traffic event lands at the end of window one's batch
    let sink = Arc::new(RecordingSink::cancelling_after(10));
    let mut scheduler = build(scenario_config(), Arc::clone(&transport), Arc::clone(&sink));
    sink.arm(scheduler.cancel_token());

    let stats = scheduler.run().await.expect("run should succeed");

    // Exactly one window's items were processed, exactly one summary emitted
    assert_eq!(stats.total_requests, 10);
    assert_eq!(transport.calls(), 10);
    assert_eq!(sink.summaries.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_mixed_classes() {
    let mut config = scenario_config();
    config.requests_per_minute = 20;
    config.mix = BehaviorMix::default(); // 0.8 / 0.15 / 0.05
    let transport = Arc::new(ScriptedTransport::new());
    let sink = Arc::new(RecordingSink::default());
    let mut scheduler = build(config, Arc::clone(&transport), Arc::clone(&sink));

    let stats = scheduler.run().await.expect("run should succeed");

    // Per window: 16 normal + 3 compromised + 1 malicious
    assert_eq!(stats.total_requests, 40);
    assert_eq!(stats.security_events, 2);
    assert_eq!(sink.security.load(Ordering::SeqCst), 2);
    // Compromise activities are a per-session Bernoulli draw; with 6
    // compromised sessions they can be at most 6
    assert!(stats.compromise_activities <= 6);
    assert_eq!(
        sink.compromise.load(Ordering::SeqCst) as u64,
        stats.compromise_activities
    );
}

#[tokio::test(start_paused = true)]
async fn test_scenario_disabled_classes_yield_no_events() {
    let mut config = scenario_config();
    config.requests_per_minute = 20;
    config.mix = BehaviorMix::default();
    config.enable_compromised = false;
    config.enable_malicious = false;
    let transport = Arc::new(ScriptedTransport::new());
    let sink = Arc::new(RecordingSink::default());
    let mut scheduler = build(config, transport, Arc::clone(&sink));

    let stats = scheduler.run().await.expect("run should succeed");

    // Only the 16 normal sessions per window remain
    assert_eq!(stats.total_requests, 32);
    assert_eq!(stats.security_events, 0);
    assert_eq!(stats.compromise_activities, 0);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_runs_only_once() {
    let transport = Arc::new(ScriptedTransport::new());
    let sink = Arc::new(RecordingSink::default());
    let mut config = scenario_config();
    config.duration = Duration::from_secs(60);
    let mut scheduler = build(config, transport, Arc::clone(&sink));

    scheduler.run().await.expect("first run should succeed");
    let second = scheduler.run().await;

    assert!(second.is_err());
    // The failed second run must not emit another summary
    assert_eq!(sink.summaries.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_same_seed_reproduces_counters() {
    let mut totals = Vec::new();
    for _ in 0..2 {
        let mut config = scenario_config();
        config.requests_per_minute = 20;
        config.mix = BehaviorMix::default();
        config.rng_seed = Some(1234);
        let transport = Arc::new(ScriptedTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let mut scheduler = build(config, transport, sink);
        let stats = scheduler.run().await.expect("run should succeed");
        totals.push((
            stats.total_requests,
            stats.security_events,
            stats.compromise_activities,
        ));
    }
    assert_eq!(totals[0], totals[1]);
}
