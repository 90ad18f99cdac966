//! Per-window behavior mix planning
//!
//! Pure arithmetic, no side effects: given the window's session target and
//! the configured mix, compute how many sessions of each class to dispatch.
//! Counts are truncated per class with no remainder redistribution, so the
//! total can fall short of the target; that under-allocation is accepted in
//! exchange for simple, reproducible quotas.

use crate::config::BehaviorMix;
use crate::item::BehaviorClass;

/// Per-class session counts for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    /// Normal browsing sessions
    pub normal: u32,
    /// Compromised-host sessions
    pub compromised: u32,
    /// Malicious attack sessions
    pub malicious: u32,
}

impl WindowPlan {
    /// Total sessions this window
    pub fn total(&self) -> u32 {
        self.normal + self.compromised + self.malicious
    }

    /// Count for one class
    pub fn count(&self, class: BehaviorClass) -> u32 {
        match class {
            BehaviorClass::Normal => self.normal,
            BehaviorClass::Compromised => self.compromised,
            BehaviorClass::Malicious => self.malicious,
        }
    }
}

/// Compute the per-class counts for one window.
///
/// Each enabled class gets `floor(window_target * fraction)` sessions;
/// disabled classes get zero regardless of their configured fraction.
pub fn plan(
    window_target: u32,
    mix: &BehaviorMix,
    enable_compromised: bool,
    enable_malicious: bool,
) -> WindowPlan {
    let quota = |fraction: f64, enabled: bool| -> u32 {
        if !enabled {
            return 0;
        }
        (window_target as f64 * fraction).floor() as u32
    };

    WindowPlan {
        normal: quota(mix.normal, true),
        compromised: quota(mix.compromised, enable_compromised),
        malicious: quota(mix.malicious, enable_malicious),
    }
}
