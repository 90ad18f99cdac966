//! Builder pattern for Scheduler construction

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use crate::rng::RandomSource;
use crate::session::SessionSimulator;
use crate::stats::StatsAggregator;
use crate::traits::{EventSink, TargetSource, Transport};

use super::executor::Scheduler;

/// Builder for creating a [`Scheduler`] with validated configuration.
///
/// # Example
///
/// ```ignore
/// let mut scheduler = SchedulerBuilder::new()
///     .config(RunConfig::default())
///     .transport(transport)
///     .targets(targets)
///     .events(sink)
///     .build()?;
/// ```
pub struct SchedulerBuilder {
    config: RunConfig,
    transport: Option<Arc<dyn Transport>>,
    targets: Option<Arc<dyn TargetSource>>,
    events: Option<Arc<dyn EventSink>>,
    run_id: Option<uuid::Uuid>,
}

impl SchedulerBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            transport: None,
            targets: None,
            events: None,
            run_id: None,
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the transport capability
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the destination data source
    pub fn targets(mut self, targets: Arc<dyn TargetSource>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Set the event sink
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Use a caller-chosen run id instead of generating one, so the
    /// scheduler's log lines and an externally created sink agree.
    pub fn run_id(mut self, run_id: uuid::Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Build the scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator is missing or the configuration is
    /// invalid; both are fatal before any window executes.
    pub fn build(self) -> Result<Scheduler> {
        let transport = self
            .transport
            .ok_or_else(|| Error::missing_component("transport"))?;
        let targets = self
            .targets
            .ok_or_else(|| Error::missing_component("targets"))?;
        let events = self
            .events
            .ok_or_else(|| Error::missing_component("events"))?;

        self.config
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;

        let rng = match self.config.rng_seed {
            Some(seed) => RandomSource::from_seed(seed),
            None => RandomSource::from_entropy(),
        };

        let cancel = CancelToken::new();
        let stats = Arc::new(StatsAggregator::new());
        let simulator = Arc::new(SessionSimulator::new(
            transport,
            Arc::clone(&targets),
            Arc::clone(&events),
            self.config.pacing,
            self.config.dry_run,
            cancel.clone(),
        ));
        let pool = WorkerPool::new(simulator, Arc::clone(&stats), self.config.concurrency);

        Ok(Scheduler::new(
            self.config,
            pool,
            targets,
            events,
            stats,
            rng,
            cancel,
            self.run_id.unwrap_or_else(uuid::Uuid::new_v4),
        ))
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
