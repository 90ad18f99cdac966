//! Work items dispatched to the worker pool

use serde::{Deserialize, Serialize};

/// Behavior class of a session.
///
/// The class fixes which sub-action generator and which data table the
/// session simulator consults; it is never mutated after the item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorClass {
    /// Plain human-like browsing
    Normal,
    /// Browsing with occasional compromised-host markers
    Compromised,
    /// A single simulated attack request
    Malicious,
}

impl BehaviorClass {
    /// Stable lowercase label used in events and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorClass::Normal => "normal",
            BehaviorClass::Compromised => "compromised",
            BehaviorClass::Malicious => "malicious",
        }
    }
}

impl std::fmt::Display for BehaviorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identifier for a work item within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        ItemId(value)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of work: a session to simulate.
///
/// Created per window by the scheduler from the planner's per-class counts,
/// consumed exactly once by the worker pool, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique item id
    pub id: ItemId,
    /// Behavior class, fixed at creation
    pub class: BehaviorClass,
    /// Destination for the session's primary request, resolved from the
    /// target source at item-creation time
    pub target: Option<String>,
    /// Seed for the session's private random stream, derived from the run's
    /// random source so a fixed run seed reproduces every session exactly
    pub seed: u64,
}
