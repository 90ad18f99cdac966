//! Session simulation
//!
//! A session is one visit-and-interact unit of work tagged with a behavior
//! class. The simulator walks a small state machine per session:
//!
//! 1. **Navigate** to the item's target; a transport error here fails the
//!    whole session and ends it early.
//! 2. **Dwell** for a jittered "reading time".
//! 3. **Interact** a few times (sub-page fetch, search, or form submit);
//!    failed interactions are recorded but tolerated.
//! 4. Compromised sessions occasionally branch into one compromised-host
//!    behavior; malicious sessions skip all of the above and deliver a single
//!    simulated attack request instead.
//!
//! Every transport error is caught at the action level and recorded in the
//! session's action list; nothing propagates out of [`SessionSimulator::run`],
//! so one session can never abort its siblings.

use crate::cancel::CancelToken;
use crate::config::PacingConfig;
use crate::event::{
    payload_fingerprint, CompromiseEvent, SecurityEvent, Severity, TrafficEvent,
};
use crate::item::{BehaviorClass, ItemId, WorkItem};
use crate::rng::uniform_ms;
use crate::traits::{CompromiseBehavior, EventSink, FetchMetrics, TargetSource, Transport};
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Probability that a compromised-class session performs a compromise
/// behavior after its normal browsing.
const COMPROMISE_PROBABILITY: f64 = 0.3;

/// Sub-page paths a session may fetch while interacting
const SUB_PAGE_PATHS: &[&str] = &[
    "/about",
    "/contact",
    "/help",
    "/privacy",
    "/terms",
    "/products",
    "/services",
    "/blog",
    "/news",
];

/// Search terms for simulated on-site searches
const SEARCH_TERMS: &[&str] = &["news", "products", "services", "help", "contact"];

/// Form body for simulated form submissions
const FORM_PAYLOAD: &str = "name=John%20Doe&email=john%40example.com&message=Test%20message";

/// Commands a simulated C2 beacon may carry
const C2_COMMANDS: &[&str] = &["heartbeat", "get_tasks", "send_data"];

/// Kind of secondary in-session request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    /// Fetch of a common sub-page path
    SubPage,
    /// On-site search query
    Search,
    /// Form submission
    FormSubmit,
}

impl InteractionKind {
    /// Stable lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::SubPage => "sub_page",
            InteractionKind::Search => "search",
            InteractionKind::FormSubmit => "form_submit",
        }
    }
}

/// Kind of one timestamped step within a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Primary visit to the session target
    Navigate,
    /// Reading-time pause
    Dwell,
    /// Secondary request
    Interact(InteractionKind),
    /// Compromised-host behavior, by behavior name
    Compromise(String),
    /// Simulated attack delivery, by pattern name
    AttackSend(String),
}

/// One recorded sub-action
#[derive(Debug, Clone)]
pub struct ActionRecord {
    /// What the step was
    pub kind: ActionKind,
    /// Offset from session start when the step began
    pub offset: Duration,
    /// How long the step took (zero for steps with no wire activity)
    pub duration: Duration,
    /// Whether the step succeeded
    pub success: bool,
    /// Error detail for failed steps
    pub error: Option<String>,
}

/// Terminal result of one session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// The work item's id
    pub id: ItemId,
    /// The work item's behavior class
    pub class: BehaviorClass,
    /// Ordered sub-action records
    pub actions: Vec<ActionRecord>,
    /// Overall session success
    pub success: bool,
    /// Error detail when the session failed
    pub error: Option<String>,
}

impl SessionOutcome {
    /// Synthesize a failed outcome with no recorded actions.
    ///
    /// Used for missing targets and for worker-level faults surfaced by the
    /// pool.
    pub fn failed(id: ItemId, class: BehaviorClass, error: impl Into<String>) -> Self {
        Self {
            id,
            class,
            actions: Vec::new(),
            success: false,
            error: Some(error.into()),
        }
    }

    /// Number of interaction sub-actions
    pub fn interact_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::Interact(_)))
            .count()
    }

    /// Number of security events this session produced (one per attack send)
    pub fn security_events(&self) -> u64 {
        self.actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::AttackSend(_)))
            .count() as u64
    }

    /// Number of compromised-host activities this session produced
    pub fn compromise_activities(&self) -> u64 {
        self.actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::Compromise(_)))
            .count() as u64
    }

    /// Latencies of the transport calls this session actually made
    pub fn transport_latencies(&self) -> impl Iterator<Item = Duration> + '_ {
        self.actions.iter().filter_map(|a| match a.kind {
            ActionKind::Navigate | ActionKind::Interact(_) | ActionKind::AttackSend(_) => {
                (!a.duration.is_zero()).then_some(a.duration)
            }
            _ => None,
        })
    }
}

/// Executes one session end to end.
///
/// Shared across all workers via `Arc`; all per-session state lives on the
/// stack of [`run`](Self::run).
pub struct SessionSimulator {
    transport: Arc<dyn Transport>,
    targets: Arc<dyn TargetSource>,
    events: Arc<dyn EventSink>,
    pacing: PacingConfig,
    dry_run: bool,
    cancel: CancelToken,
}

impl SessionSimulator {
    /// Create a simulator over the given collaborators
    pub fn new(
        transport: Arc<dyn Transport>,
        targets: Arc<dyn TargetSource>,
        events: Arc<dyn EventSink>,
        pacing: PacingConfig,
        dry_run: bool,
        cancel: CancelToken,
    ) -> Self {
        Self {
            transport,
            targets,
            events,
            pacing,
            dry_run,
            cancel,
        }
    }

    /// Run one session to completion.
    ///
    /// Never returns an error: every failure mode ends up inside the
    /// returned [`SessionOutcome`].
    pub async fn run(&self, item: &WorkItem) -> SessionOutcome {
        let mut rng = ChaCha8Rng::seed_from_u64(item.seed);
        let started = Instant::now();

        match item.class {
            BehaviorClass::Malicious => self.run_attack(item, &mut rng, started).await,
            _ => self.run_browsing(item, &mut rng, started).await,
        }
    }

    async fn run_browsing(
        &self,
        item: &WorkItem,
        rng: &mut ChaCha8Rng,
        started: Instant,
    ) -> SessionOutcome {
        let class_label = item.class.as_str();
        let target = match &item.target {
            Some(target) => target.clone(),
            None => return SessionOutcome::failed(item.id, item.class, "work item has no target"),
        };

        let mut actions = Vec::new();

        if self.cancel.is_cancelled() {
            return SessionOutcome {
                id: item.id,
                class: item.class,
                actions,
                success: true,
                error: None,
            };
        }

        // Navigate: a transport error here discards the rest of the session.
        let navigate = self
            .issue(ActionKind::Navigate, &target, "GET", None, class_label, started)
            .await;
        let navigate_err = navigate.error.clone();
        let navigated = navigate.error.is_none();
        actions.push(navigate);
        if !navigated {
            tracing::debug!(item = %item.id, target = %target, "navigate failed, session discarded");
            return SessionOutcome {
                id: item.id,
                class: item.class,
                actions,
                success: false,
                error: navigate_err,
            };
        }

        // Dwell: the dominant wall-clock cost per session.
        if !self.cancel.is_cancelled() {
            let offset = started.elapsed();
            let dwell = uniform_ms(rng, self.pacing.dwell_min_ms, self.pacing.dwell_max_ms);
            tokio::time::sleep(dwell).await;
            actions.push(ActionRecord {
                kind: ActionKind::Dwell,
                offset,
                duration: dwell,
                success: true,
                error: None,
            });
        }

        // Interactions: failures are logged but tolerated.
        let interactions = if self.pacing.interactions_min >= self.pacing.interactions_max {
            self.pacing.interactions_min
        } else {
            rng.gen_range(self.pacing.interactions_min..=self.pacing.interactions_max)
        };
        for _ in 0..interactions {
            if self.cancel.is_cancelled() {
                break;
            }
            let kind = match rng.gen_range(0..3u8) {
                0 => InteractionKind::SubPage,
                1 => InteractionKind::Search,
                _ => InteractionKind::FormSubmit,
            };
            let record = match kind {
                InteractionKind::SubPage => {
                    let path = SUB_PAGE_PATHS[rng.gen_range(0..SUB_PAGE_PATHS.len())];
                    let url = format!("{}{}", target.trim_end_matches('/'), path);
                    self.issue(ActionKind::Interact(kind), &url, "GET", None, class_label, started)
                        .await
                }
                InteractionKind::Search => {
                    let term = SEARCH_TERMS[rng.gen_range(0..SEARCH_TERMS.len())];
                    let url = format!(
                        "{}/search?q={}",
                        target.trim_end_matches('/'),
                        urlencoding::encode(term)
                    );
                    self.issue(ActionKind::Interact(kind), &url, "GET", None, class_label, started)
                        .await
                }
                InteractionKind::FormSubmit => {
                    self.issue(
                        ActionKind::Interact(kind),
                        &target,
                        "POST",
                        Some(FORM_PAYLOAD),
                        class_label,
                        started,
                    )
                    .await
                }
            };
            actions.push(record);

            let delay = uniform_ms(
                rng,
                self.pacing.interaction_delay_min_ms,
                self.pacing.interaction_delay_max_ms,
            );
            tokio::time::sleep(delay).await;
        }

        // Compromise branch: event always, wire traffic only on live-fire.
        if item.class == BehaviorClass::Compromised
            && !self.cancel.is_cancelled()
            && rng.gen::<f64>() < COMPROMISE_PROBABILITY
        {
            let record = self.run_compromise(rng, started).await;
            actions.push(record);
        }

        SessionOutcome {
            id: item.id,
            class: item.class,
            actions,
            success: true,
            error: None,
        }
    }

    async fn run_compromise(&self, rng: &mut ChaCha8Rng, started: Instant) -> ActionRecord {
        let behavior = self.targets.compromise_behavior(rng);
        let payload = synthesize_payload(&behavior, rng);
        let fingerprint = payload_fingerprint(&payload);
        let offset = started.elapsed();

        let mut carried_out = false;
        let mut duration = Duration::ZERO;
        let mut error = None;

        // Only the C2 beacon ever goes on the wire, and only on explicit
        // opt-in; every other behavior is a log-only marker.
        if !self.dry_run && behavior.name == "c2_communication" {
            let url = format!("http://{}/api/client", behavior.target);
            let call_start = Instant::now();
            match self
                .transport
                .submit(&url, &behavior.method, &payload)
                .await
            {
                Ok(metrics) => {
                    carried_out = metrics.is_success();
                    duration = metrics.elapsed;
                    self.events.traffic(TrafficEvent {
                        method: behavior.method.clone(),
                        target: url,
                        status: Some(metrics.status),
                        latency_ms: metrics.elapsed.as_secs_f64() * 1_000.0,
                        classification: BehaviorClass::Compromised.as_str().to_string(),
                        timestamp: Utc::now(),
                    });
                }
                Err(e) => {
                    duration = call_start.elapsed();
                    error = Some(e.to_string());
                }
            }
        }

        self.events.compromise(CompromiseEvent {
            behavior: behavior.name.clone(),
            target: behavior.target.clone(),
            payload_fingerprint: fingerprint,
            success: carried_out,
            timestamp: Utc::now(),
        });

        ActionRecord {
            kind: ActionKind::Compromise(behavior.name),
            offset,
            duration,
            success: true,
            error,
        }
    }

    async fn run_attack(
        &self,
        item: &WorkItem,
        rng: &mut ChaCha8Rng,
        started: Instant,
    ) -> SessionOutcome {
        if self.cancel.is_cancelled() {
            return SessionOutcome {
                id: item.id,
                class: item.class,
                actions: Vec::new(),
                success: true,
                error: None,
            };
        }

        let pattern = self.targets.attack_pattern(rng);
        let target = match &item.target {
            Some(target) => target.clone(),
            None => self.targets.malicious_target(rng),
        };
        let url = format!(
            "{}/{}?payload={}",
            target.trim_end_matches('/'),
            pattern.field,
            urlencoding::encode(&pattern.payload)
        );

        let mut indicators = HashMap::new();
        indicators.insert("target_field".to_string(), pattern.field.clone());
        indicators.insert("payload".to_string(), pattern.payload.clone());
        indicators.insert("url".to_string(), url.clone());
        self.events.security(SecurityEvent {
            kind: pattern.name.clone(),
            description: format!("simulated {} attack against {}", pattern.name, target),
            severity: Severity::High,
            indicators,
            timestamp: Utc::now(),
        });

        let offset = started.elapsed();
        let record = if self.dry_run {
            ActionRecord {
                kind: ActionKind::AttackSend(pattern.name.clone()),
                offset,
                duration: Duration::ZERO,
                success: true,
                error: None,
            }
        } else {
            let mut record = self
                .issue(
                    ActionKind::AttackSend(pattern.name.clone()),
                    &url,
                    "GET",
                    None,
                    BehaviorClass::Malicious.as_str(),
                    started,
                )
                .await;
            record.offset = offset;
            record
        };

        let success = record.success;
        let error = record.error.clone();
        SessionOutcome {
            id: item.id,
            class: item.class,
            actions: vec![record],
            success,
            error,
        }
    }

    /// Issue one transport call, emit the traffic event, and build the
    /// action record. Transport errors are absorbed into the record.
    async fn issue(
        &self,
        kind: ActionKind,
        url: &str,
        method: &str,
        payload: Option<&str>,
        classification: &str,
        session_start: Instant,
    ) -> ActionRecord {
        let offset = session_start.elapsed();
        let call_start = Instant::now();
        let result = match payload {
            Some(body) => self.transport.submit(url, method, body).await,
            None => self.transport.visit(url).await,
        };

        let (status, duration, success, error) = match result {
            Ok(FetchMetrics { status, elapsed }) => {
                (Some(status), elapsed, status < 400, None)
            }
            Err(e) => (None, call_start.elapsed(), false, Some(e.to_string())),
        };

        self.events.traffic(TrafficEvent {
            method: method.to_string(),
            target: url.to_string(),
            status,
            latency_ms: duration.as_secs_f64() * 1_000.0,
            classification: classification.to_string(),
            timestamp: Utc::now(),
        });

        ActionRecord {
            kind,
            offset,
            duration,
            success,
            error,
        }
    }
}

/// Synthesize the descriptive payload for a compromise behavior.
///
/// The strings are markers for downstream analyzers, not working exploits.
fn synthesize_payload(behavior: &CompromiseBehavior, rng: &mut ChaCha8Rng) -> String {
    match behavior.name.as_str() {
        "c2_communication" => format!(
            "id={} command={} data={}",
            hex_string(rng, 16),
            C2_COMMANDS[rng.gen_range(0..C2_COMMANDS.len())],
            hex_string(rng, 64),
        ),
        "credential_theft" => {
            "username=admin password=password123 action=harvest_credentials".to_string()
        }
        "data_exfiltration" => format!(
            "files=documents.zip,database.sql,credentials.txt size={}MB compression=encrypted",
            rng.gen_range(1..=100)
        ),
        "lateral_movement" => format!(
            "action={} range=10.0.0.0/24 hosts={}",
            behavior.indicator,
            rng.gen_range(1..=32)
        ),
        "persistence" => format!(
            "action={} service=update-helper autostart=true",
            behavior.indicator
        ),
        other => format!("behavior={}", other),
    }
}

fn hex_string(rng: &mut ChaCha8Rng, len: usize) -> String {
    (0..len.div_ceil(2))
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect::<String>()[..len]
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{AttackPattern, TransportError};
    use async_trait::async_trait;
    use rand::RngCore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // ========================================================================
    // Doubles
    // ========================================================================

    /// Transport double that records every call and can fail on schedule.
    struct StubTransport {
        calls: Mutex<Vec<(String, String)>>,
        counter: AtomicUsize,
        fail_every: Option<usize>,
    }

    impl StubTransport {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                counter: AtomicUsize::new(0),
                fail_every: None,
            }
        }

        fn with_fail_every(mut self, n: usize) -> Self {
            self.fail_every = Some(n);
            self
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, method: &str, url: &str) -> Result<FetchMetrics, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), url.to_string()));
            let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(every) = self.fail_every {
                if count % every == 0 {
                    return Err(TransportError::InvalidTarget("scheduled failure".into()));
                }
            }
            Ok(FetchMetrics {
                status: 200,
                elapsed: Duration::from_millis(5),
            })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn visit(&self, target: &str) -> Result<FetchMetrics, TransportError> {
            self.record("GET", target)
        }

        async fn submit(
            &self,
            target: &str,
            method: &str,
            _payload: &str,
        ) -> Result<FetchMetrics, TransportError> {
            self.record(method, target)
        }
    }

    struct StubTargets;

    impl TargetSource for StubTargets {
        fn benign_target(&self, _rng: &mut dyn RngCore) -> String {
            "https://example.com".to_string()
        }

        fn malicious_target(&self, _rng: &mut dyn RngCore) -> String {
            "http://malicious.example".to_string()
        }

        fn attack_pattern(&self, _rng: &mut dyn RngCore) -> AttackPattern {
            AttackPattern {
                name: "sql_injection".to_string(),
                payload: "' OR 1=1--".to_string(),
                field: "search".to_string(),
            }
        }

        fn compromise_behavior(&self, _rng: &mut dyn RngCore) -> CompromiseBehavior {
            CompromiseBehavior {
                name: "c2_communication".to_string(),
                target: "c2.evil.example".to_string(),
                method: "POST".to_string(),
                indicator: "beacon".to_string(),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        traffic: Mutex<Vec<TrafficEvent>>,
        security: Mutex<Vec<SecurityEvent>>,
        compromise: Mutex<Vec<CompromiseEvent>>,
        summaries: AtomicUsize,
    }

    impl EventSink for RecordingSink {
        fn traffic(&self, event: TrafficEvent) {
            self.traffic.lock().unwrap().push(event);
        }

        fn security(&self, event: SecurityEvent) {
            self.security.lock().unwrap().push(event);
        }

        fn compromise(&self, event: CompromiseEvent) {
            self.compromise.lock().unwrap().push(event);
        }

        fn summary(&self, _summary: &crate::event::SummaryMap) {
            self.summaries.fetch_add(1, Ordering::SeqCst);
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn fast_pacing(interactions: u32) -> PacingConfig {
        PacingConfig {
            window_secs: 60,
            dwell_min_ms: 0,
            dwell_max_ms: 0,
            interactions_min: interactions,
            interactions_max: interactions,
            interaction_delay_min_ms: 0,
            interaction_delay_max_ms: 0,
            timeout_secs: 15,
        }
    }

    fn simulator(
        transport: Arc<StubTransport>,
        sink: Arc<RecordingSink>,
        pacing: PacingConfig,
        dry_run: bool,
    ) -> SessionSimulator {
        SessionSimulator::new(
            transport,
            Arc::new(StubTargets),
            sink,
            pacing,
            dry_run,
            CancelToken::new(),
        )
    }

    fn item(id: u64, class: BehaviorClass, target: Option<&str>, seed: u64) -> WorkItem {
        WorkItem {
            id: ItemId(id),
            class,
            target: target.map(str::to_string),
            seed,
        }
    }

    /// Smallest seed whose first f64 draw lands under the compromise
    /// probability, so the compromise branch deterministically triggers.
    fn compromising_seed() -> u64 {
        (0..10_000)
            .find(|&s| ChaCha8Rng::seed_from_u64(s).gen::<f64>() < COMPROMISE_PROBABILITY)
            .expect("some seed under 10000 must trigger the branch")
    }

    /// Smallest seed whose first f64 draw misses the compromise probability.
    fn non_compromising_seed() -> u64 {
        (0..10_000)
            .find(|&s| ChaCha8Rng::seed_from_u64(s).gen::<f64>() >= COMPROMISE_PROBABILITY)
            .expect("some seed under 10000 must miss the branch")
    }

    // ========================================================================
    // Tests
    // ========================================================================

    #[tokio::test]
    async fn test_normal_session_navigates_and_interacts() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink.clone(), fast_pacing(3), true);

        let outcome = sim
            .run(&item(1, BehaviorClass::Normal, Some("https://example.com"), 9))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.interact_count(), 3);
        // navigate + 3 interactions
        assert_eq!(transport.calls().len(), 4);
        assert_eq!(sink.traffic.lock().unwrap().len(), 4);
        assert_eq!(outcome.security_events(), 0);
        assert_eq!(outcome.compromise_activities(), 0);
        // Sub-actions are strictly sequential
        let offsets: Vec<_> = outcome.actions.iter().map(|a| a.offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_failed_navigate_ends_session_early() {
        let transport = Arc::new(StubTransport::new().with_fail_every(1));
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink.clone(), fast_pacing(5), true);

        let outcome = sim
            .run(&item(1, BehaviorClass::Normal, Some("https://example.com"), 9))
            .await;

        assert!(!outcome.success);
        assert!(outcome.error.is_some());
        assert_eq!(outcome.interact_count(), 0);
        assert_eq!(outcome.actions.len(), 1);
        assert!(matches!(outcome.actions[0].kind, ActionKind::Navigate));
        // Only the navigate attempt hit the transport
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_interaction_is_tolerated() {
        // Second transport call (the first interaction) fails
        let transport = Arc::new(StubTransport::new().with_fail_every(2));
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink.clone(), fast_pacing(3), true);

        let outcome = sim
            .run(&item(1, BehaviorClass::Normal, Some("https://example.com"), 9))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.interact_count(), 3);
        let failed: Vec<_> = outcome
            .actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::Interact(_)) && !a.success)
            .collect();
        assert!(!failed.is_empty());
        assert!(failed.iter().all(|a| a.error.is_some()));
    }

    #[tokio::test]
    async fn test_missing_target_fails_fast() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink, fast_pacing(1), true);

        let outcome = sim.run(&item(1, BehaviorClass::Normal, None, 9)).await;

        assert!(!outcome.success);
        assert!(outcome.actions.is_empty());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_compromise_emits_event_without_wire_traffic() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink.clone(), fast_pacing(0), true);
        let seed = compromising_seed();

        let outcome = sim
            .run(&item(
                1,
                BehaviorClass::Compromised,
                Some("https://example.com"),
                seed,
            ))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.compromise_activities(), 1);
        // Only the navigate call went out; the C2 beacon stayed local
        assert_eq!(transport.calls().len(), 1);
        let events = sink.compromise.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].behavior, "c2_communication");
        assert!(!events[0].success);
        assert_eq!(events[0].payload_fingerprint.len(), 16);
    }

    #[tokio::test]
    async fn test_live_fire_compromise_sends_beacon() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink.clone(), fast_pacing(0), false);
        let seed = compromising_seed();

        let outcome = sim
            .run(&item(
                1,
                BehaviorClass::Compromised,
                Some("https://example.com"),
                seed,
            ))
            .await;

        assert!(outcome.success);
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, "POST");
        assert!(calls[1].1.contains("c2.evil.example"));
        let events = sink.compromise.lock().unwrap();
        assert!(events[0].success);
    }

    #[tokio::test]
    async fn test_compromise_branch_respects_probability_draw() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport, sink.clone(), fast_pacing(0), true);
        let seed = non_compromising_seed();

        let outcome = sim
            .run(&item(
                1,
                BehaviorClass::Compromised,
                Some("https://example.com"),
                seed,
            ))
            .await;

        assert_eq!(outcome.compromise_activities(), 0);
        assert!(sink.compromise.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malicious_dry_run_emits_security_event_only() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink.clone(), fast_pacing(5), true);

        let outcome = sim
            .run(&item(
                1,
                BehaviorClass::Malicious,
                Some("http://malicious.example"),
                3,
            ))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.security_events(), 1);
        assert_eq!(outcome.interact_count(), 0);
        assert!(transport.calls().is_empty());

        let events = sink.security.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "sql_injection");
        assert_eq!(events[0].severity, Severity::High);
        assert!(events[0].indicators.contains_key("payload"));
    }

    #[tokio::test]
    async fn test_malicious_live_fire_issues_encoded_request() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let sim = simulator(transport.clone(), sink.clone(), fast_pacing(5), false);

        let outcome = sim
            .run(&item(
                1,
                BehaviorClass::Malicious,
                Some("http://malicious.example"),
                3,
            ))
            .await;

        assert!(outcome.success);
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.starts_with("http://malicious.example/search?payload="));
        // Payload is percent-encoded into the query
        assert!(!calls[0].1.contains(' '));
        assert_eq!(sink.traffic.lock().unwrap().len(), 1);
        assert_eq!(
            sink.traffic.lock().unwrap()[0].classification,
            "malicious"
        );
    }

    #[tokio::test]
    async fn test_same_seed_reproduces_action_sequence() {
        let pacing = fast_pacing(0);
        let mut sequences = Vec::new();
        for _ in 0..2 {
            let transport = Arc::new(StubTransport::new());
            let sink = Arc::new(RecordingSink::default());
            let sim = SessionSimulator::new(
                transport,
                Arc::new(StubTargets),
                sink,
                PacingConfig {
                    interactions_min: 1,
                    interactions_max: 5,
                    ..pacing
                },
                true,
                CancelToken::new(),
            );
            let outcome = sim
                .run(&item(1, BehaviorClass::Normal, Some("https://example.com"), 77))
                .await;
            sequences.push(
                outcome
                    .actions
                    .iter()
                    .map(|a| a.kind.clone())
                    .collect::<Vec<_>>(),
            );
        }
        assert_eq!(sequences[0], sequences[1]);
    }

    #[tokio::test]
    async fn test_cancelled_session_returns_promptly() {
        let transport = Arc::new(StubTransport::new());
        let sink = Arc::new(RecordingSink::default());
        let cancel = CancelToken::new();
        cancel.cancel();
        let sim = SessionSimulator::new(
            transport.clone(),
            Arc::new(StubTargets),
            sink,
            fast_pacing(5),
            true,
            cancel,
        );

        let outcome = sim
            .run(&item(1, BehaviorClass::Normal, Some("https://example.com"), 9))
            .await;

        assert!(outcome.actions.is_empty());
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_payload_synthesis_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let c2 = CompromiseBehavior {
            name: "c2_communication".into(),
            target: "c2.evil.example".into(),
            method: "POST".into(),
            indicator: "beacon".into(),
        };
        let payload = synthesize_payload(&c2, &mut rng);
        assert!(payload.starts_with("id="));
        assert!(payload.contains("command="));
        assert!(payload.contains("data="));

        let theft = CompromiseBehavior {
            name: "credential_theft".into(),
            target: "https://example.com".into(),
            method: "POST".into(),
            indicator: "password".into(),
        };
        assert!(synthesize_payload(&theft, &mut rng).contains("harvest_credentials"));

        let lateral = CompromiseBehavior {
            name: "lateral_movement".into(),
            target: "http://intranet.local/admin".into(),
            method: "GET".into(),
            indicator: "enumerate".into(),
        };
        assert!(synthesize_payload(&lateral, &mut rng).contains("action=enumerate"));
    }

    #[test]
    fn test_hex_string_length_and_charset() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let s = hex_string(&mut rng, 16);
        assert_eq!(s.len(), 16);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        let odd = hex_string(&mut rng, 7);
        assert_eq!(odd.len(), 7);
    }
}
