//! Windowed run scheduler
//!
//! The scheduler is the top-level control loop of a run:
//! - partitions the configured duration into fixed windows
//! - asks the planner for per-class session counts each window
//! - builds and shuffles the window's work items
//! - hands the batch to the worker pool and waits for it to drain
//! - sleeps out the window remainder to hold the target rate
//! - flushes the final stats summary exactly once
//!
//! # Example
//!
//! ```ignore
//! use websim_core::scheduler::SchedulerBuilder;
//!
//! let mut scheduler = SchedulerBuilder::new()
//!     .config(config)
//!     .transport(transport)
//!     .targets(targets)
//!     .events(sink)
//!     .build()?;
//!
//! let stats = scheduler.run_with_signal_handling().await?;
//! ```

mod builder;
mod executor;

pub use builder::SchedulerBuilder;
pub use executor::{Scheduler, SchedulerState};

#[cfg(test)]
mod tests;
