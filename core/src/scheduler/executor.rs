//! The windowed scheduling loop

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::time::Instant;
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::item::{BehaviorClass, ItemId, WorkItem};
use crate::planner::{self, WindowPlan};
use crate::pool::WorkerPool;
use crate::rng::RandomSource;
use crate::stats::{RunStats, StatsAggregator};
use crate::traits::{EventSink, TargetSource};

/// Lifecycle state of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Built, not yet started
    Idle,
    /// Dispatching windows
    Running,
    /// Run duration reached, last batch drained
    Draining,
    /// Cancellation requested, last batch drained
    Cancelled,
    /// Summary flushed, nothing left to do
    Stopped,
}

/// Top-level control loop composing planner, pool, and aggregator across the
/// configured run duration.
///
/// Use [`SchedulerBuilder`](super::SchedulerBuilder) to construct one.
pub struct Scheduler {
    config: RunConfig,
    pool: WorkerPool,
    targets: Arc<dyn TargetSource>,
    events: Arc<dyn EventSink>,
    stats: Arc<StatsAggregator>,
    rng: RandomSource,
    cancel: CancelToken,
    state: SchedulerState,
    next_item_id: u64,
    run_id: Uuid,
}

impl Scheduler {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        config: RunConfig,
        pool: WorkerPool,
        targets: Arc<dyn TargetSource>,
        events: Arc<dyn EventSink>,
        stats: Arc<StatsAggregator>,
        rng: RandomSource,
        cancel: CancelToken,
        run_id: Uuid,
    ) -> Self {
        Self {
            config,
            pool,
            targets,
            events,
            stats,
            rng,
            cancel,
            state: SchedulerState::Idle,
            next_item_id: 0,
            run_id,
        }
    }

    /// The run's configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The run's unique identifier
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The seed driving this run's random source
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Token for requesting cancellation from outside the loop
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Shared statistics aggregator
    pub fn stats(&self) -> Arc<StatsAggregator> {
        Arc::clone(&self.stats)
    }

    /// Run the full generation loop.
    ///
    /// Returns the final statistics after the summary event has been
    /// flushed. A scheduler runs at most once.
    pub async fn run(&mut self) -> Result<RunStats> {
        if self.state != SchedulerState::Idle {
            return Err(Error::scheduler("scheduler has already run"));
        }
        self.state = SchedulerState::Running;

        let window_len = self.config.pacing.window();
        let started = Instant::now();
        let deadline = started + self.config.duration;

        tracing::info!(
            run_id = %self.run_id,
            duration = ?self.config.duration,
            requests_per_minute = self.config.requests_per_minute,
            concurrency = self.config.concurrency,
            seed = self.rng.seed(),
            dry_run = self.config.dry_run,
            "starting traffic generation"
        );

        let mut window_index: u64 = 0;
        while Instant::now() < deadline && !self.cancel.is_cancelled() {
            let window_start = Instant::now();

            let plan = planner::plan(
                self.config.requests_per_minute,
                &self.config.mix,
                self.config.enable_compromised,
                self.config.enable_malicious,
            );
            let batch = self.build_batch(&plan);
            let outcomes = self.pool.execute(batch).await;

            window_index += 1;
            tracing::info!(
                window = window_index,
                normal = plan.normal,
                compromised = plan.compromised,
                malicious = plan.malicious,
                completed = outcomes.len(),
                "window completed"
            );

            // The end-of-window sleep is what holds the configured rate; an
            // overrunning window proceeds immediately, so the rate target is
            // a ceiling under slow transports, not a guarantee.
            let elapsed = window_start.elapsed();
            if elapsed < window_len {
                tokio::select! {
                    _ = tokio::time::sleep(window_len - elapsed) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        }

        self.state = if self.cancel.is_cancelled() {
            tracing::info!(run_id = %self.run_id, "run cancelled, draining complete");
            SchedulerState::Cancelled
        } else {
            SchedulerState::Draining
        };

        let stats = self.stats.snapshot();
        self.events.summary(&stats.to_summary());
        tracing::info!(
            run_id = %self.run_id,
            windows = window_index,
            total_requests = stats.total_requests,
            successful_requests = stats.successful_requests,
            failed_requests = stats.failed_requests,
            security_events = stats.security_events,
            compromise_activities = stats.compromise_activities,
            "run complete"
        );
        self.state = SchedulerState::Stopped;

        Ok(stats)
    }

    /// Run with Ctrl+C handling: the first interrupt requests a graceful
    /// drain of the in-flight window, then the summary is flushed as usual.
    pub async fn run_with_signal_handling(&mut self) -> Result<RunStats> {
        let cancel = self.cancel.clone();
        let signal = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("received Ctrl+C, draining current window...");
                    cancel.cancel();
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run().await;
        signal.abort();
        result
    }

    /// Build one window's worth of work items, shuffled so sessions of the
    /// same class don't arrive in a burst.
    fn build_batch(&mut self, plan: &WindowPlan) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(plan.total() as usize);
        for _ in 0..plan.normal {
            items.push(self.make_item(BehaviorClass::Normal));
        }
        for _ in 0..plan.compromised {
            items.push(self.make_item(BehaviorClass::Compromised));
        }
        for _ in 0..plan.malicious {
            items.push(self.make_item(BehaviorClass::Malicious));
        }
        items.shuffle(self.rng.rng());
        items
    }

    fn make_item(&mut self, class: BehaviorClass) -> WorkItem {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        let target = match class {
            BehaviorClass::Malicious => self.targets.malicious_target(self.rng.rng()),
            _ => self.targets.benign_target(self.rng.rng()),
        };
        WorkItem {
            id,
            class,
            target: Some(target),
            seed: self.rng.child_seed(),
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("run_id", &self.run_id)
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}
