//! websim-core: rate-controlled synthetic traffic generation
//!
//! This crate provides the scheduler core of websim:
//!
//! - The windowed [`scheduler`] loop pacing sessions toward a target rate
//! - [`session`] simulation (navigate, dwell, interact, compromise, attack)
//! - The bounded-concurrency worker [`pool`]
//! - Thread-safe [`stats`] aggregation
//! - Narrow [`traits`] decoupling the core from transports and data tables
//!
//! Everything destructive is gated by the `dry_run` flag in [`config`];
//! with the default configuration no compromise or attack payload ever
//! reaches the wire.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod event;
pub mod item;
pub mod planner;
pub mod pool;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod sink;
pub mod stats;
pub mod traits;

pub use cancel::CancelToken;
pub use config::{parse_duration, BehaviorMix, ConfigError, PacingConfig, RunConfig};
pub use error::{Error, ErrorKind, Result};
pub use event::{
    payload_fingerprint, CompromiseEvent, SecurityEvent, Severity, SummaryMap, TrafficEvent,
};
pub use item::{BehaviorClass, ItemId, WorkItem};
pub use planner::{plan, WindowPlan};
pub use pool::WorkerPool;
pub use rng::{uniform_ms, RandomSource};
pub use scheduler::{Scheduler, SchedulerBuilder, SchedulerState};
pub use session::{ActionKind, ActionRecord, InteractionKind, SessionOutcome, SessionSimulator};
pub use sink::TracingEventSink;
pub use stats::{RunStats, StatsAggregator};
pub use traits::{
    AttackPattern, CompromiseBehavior, EventSink, FetchMetrics, TargetSource, Transport,
    TransportError,
};
