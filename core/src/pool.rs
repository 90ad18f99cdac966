//! Bounded-concurrency session executor
//!
//! The pool runs one batch of work items per scheduling window. At most
//! `concurrency` sessions hold a semaphore permit at any moment; excess items
//! queue on the semaphore. One session's failure, including a panic inside
//! its task, is captured as a failed outcome for that item only and never
//! cancels or corrupts its siblings.

use crate::item::WorkItem;
use crate::session::{SessionOutcome, SessionSimulator};
use crate::stats::StatsAggregator;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Reusable executor for per-window session batches
pub struct WorkerPool {
    simulator: Arc<SessionSimulator>,
    stats: Arc<StatsAggregator>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl WorkerPool {
    /// Create a pool with the given concurrency limit.
    ///
    /// The same pool (and the same semaphore) is reused for every window of
    /// the run rather than recreated per batch.
    pub fn new(
        simulator: Arc<SessionSimulator>,
        stats: Arc<StatsAggregator>,
        concurrency: usize,
    ) -> Self {
        Self {
            simulator,
            stats,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    /// Configured concurrency limit
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run every item to completion and return the outcomes.
    ///
    /// Items are consumed in the order given; outcomes are collected in task
    /// order but each is recorded into the aggregator the moment its session
    /// finishes. Blocks until the whole batch has drained.
    pub async fn execute(&self, items: Vec<WorkItem>) -> Vec<SessionOutcome> {
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            let id = item.id;
            let class = item.class;
            let simulator = Arc::clone(&self.simulator);
            let stats = Arc::clone(&self.stats);
            let semaphore = Arc::clone(&self.semaphore);

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("pool semaphore is never closed");
                let outcome = simulator.run(&item).await;
                stats.record_outcome(&outcome);
                outcome
            });
            handles.push((id, class, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (id, class, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    // A panicked session is a failed item, not a failed batch.
                    tracing::error!(item = %id, error = %e, "session task panicked");
                    let outcome =
                        SessionOutcome::failed(id, class, format!("session task panicked: {}", e));
                    self.stats.record_outcome(&outcome);
                    outcomes.push(outcome);
                }
            }
        }
        outcomes
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
