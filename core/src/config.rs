//! Run configuration types
//!
//! A [`RunConfig`] is immutable for the lifetime of a run: it is validated
//! once at startup and then owned by the scheduler. Fields mirror the JSON
//! configuration file, so a partial file overrides only the keys it names.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Fraction of each window allocated to each behavior class.
///
/// Fractions may sum to less than 1.0; the remainder of the window target is
/// simply not scheduled. Per-class counts are truncated, never redistributed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorMix {
    /// Fraction of normal browsing sessions
    pub normal: f64,
    /// Fraction of compromised-host sessions
    pub compromised: f64,
    /// Fraction of malicious attack sessions
    pub malicious: f64,
}

impl Default for BehaviorMix {
    fn default() -> Self {
        Self {
            normal: 0.8,
            compromised: 0.15,
            malicious: 0.05,
        }
    }
}

impl BehaviorMix {
    /// Sum of all three fractions
    pub fn sum(&self) -> f64 {
        self.normal + self.compromised + self.malicious
    }
}

/// Timing knobs for session pacing and window length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Scheduling window length in seconds
    pub window_secs: u64,
    /// Minimum dwell ("reading time") per session, milliseconds
    pub dwell_min_ms: u64,
    /// Maximum dwell per session, milliseconds
    pub dwell_max_ms: u64,
    /// Minimum number of page interactions per session
    pub interactions_min: u32,
    /// Maximum number of page interactions per session
    pub interactions_max: u32,
    /// Minimum delay between interactions, milliseconds
    pub interaction_delay_min_ms: u64,
    /// Maximum delay between interactions, milliseconds
    pub interaction_delay_max_ms: u64,
    /// Per-request transport timeout in seconds
    pub timeout_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            dwell_min_ms: 2_000,
            dwell_max_ms: 15_000,
            interactions_min: 1,
            interactions_max: 5,
            interaction_delay_min_ms: 500,
            interaction_delay_max_ms: 3_000,
            timeout_secs: 15,
        }
    }
}

impl PacingConfig {
    /// Window length as a [`Duration`]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Transport timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Full configuration for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Total run duration
    #[serde(with = "duration_string")]
    pub duration: Duration,
    /// Target sessions per window
    pub requests_per_minute: u32,
    /// Maximum number of concurrently running sessions
    pub concurrency: usize,
    /// Per-class window fractions
    pub mix: BehaviorMix,
    /// Whether compromised-host sessions are scheduled at all
    pub enable_compromised: bool,
    /// Whether malicious attack sessions are scheduled at all
    pub enable_malicious: bool,
    /// When true (the default), compromise and attack payloads are logged as
    /// events but never transmitted.
    pub dry_run: bool,
    /// Seed for the run's random source; a random seed is drawn when absent
    pub rng_seed: Option<u64>,
    /// Session pacing and window timing
    pub pacing: PacingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60 * 60),
            requests_per_minute: 15,
            concurrency: 8,
            mix: BehaviorMix::default(),
            enable_compromised: true,
            enable_malicious: true,
            dry_run: true,
            rng_seed: None,
            pacing: PacingConfig::default(),
        }
    }
}

impl RunConfig {
    /// Set the run duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the per-window session target
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = rpm;
        self
    }

    /// Set the concurrency limit
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the behavior mix
    pub fn with_mix(mut self, mix: BehaviorMix) -> Self {
        self.mix = mix;
        self
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Load configuration from a JSON file.
    ///
    /// Keys absent from the file keep their default values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: RunConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Called once before any window executes; every violation here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(
                "duration must be non-zero".into(),
            ));
        }
        if self.requests_per_minute == 0 {
            return Err(ConfigError::InvalidRate(
                "requests_per_minute must be at least 1".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "concurrency must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("normal", self.mix.normal),
            ("compromised", self.mix.compromised),
            ("malicious", self.mix.malicious),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidMix(format!(
                    "mix.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.mix.sum() > 1.0 + f64::EPSILON {
            return Err(ConfigError::InvalidMix(format!(
                "mix fractions must sum to at most 1.0, got {}",
                self.mix.sum()
            )));
        }
        let p = &self.pacing;
        if p.window_secs == 0 {
            return Err(ConfigError::InvalidPacing(
                "window_secs must be at least 1".into(),
            ));
        }
        if p.dwell_min_ms > p.dwell_max_ms {
            return Err(ConfigError::InvalidPacing(
                "dwell_min_ms must not exceed dwell_max_ms".into(),
            ));
        }
        if p.interactions_min > p.interactions_max {
            return Err(ConfigError::InvalidPacing(
                "interactions_min must not exceed interactions_max".into(),
            ));
        }
        if p.interaction_delay_min_ms > p.interaction_delay_max_ms {
            return Err(ConfigError::InvalidPacing(
                "interaction_delay_min_ms must not exceed interaction_delay_max_ms".into(),
            ));
        }
        if p.timeout_secs == 0 {
            return Err(ConfigError::InvalidPacing(
                "timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation and loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid duration value or string
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// Invalid request rate
    #[error("invalid rate: {0}")]
    InvalidRate(String),

    /// Invalid concurrency value
    #[error("invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid behavior mix fractions
    #[error("invalid mix: {0}")]
    InvalidMix(String),

    /// Invalid pacing values
    #[error("invalid pacing: {0}")]
    InvalidPacing(String),

    /// Config file could not be read
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a duration string such as `"45s"`, `"30m"`, or `"2h"`.
///
/// A bare number is interpreted as minutes.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ConfigError::InvalidDuration("empty string".into()));
    }
    let (value, multiplier) = match input.chars().last() {
        Some('s') => (&input[..input.len() - 1], 1),
        Some('m') => (&input[..input.len() - 1], 60),
        Some('h') => (&input[..input.len() - 1], 3_600),
        Some(c) if c.is_ascii_digit() => (input, 60),
        _ => {
            return Err(ConfigError::InvalidDuration(format!(
                "expected <number>[s|m|h], got {:?}",
                input
            )))
        }
    };
    let value: u64 = value.parse().map_err(|_| {
        ConfigError::InvalidDuration(format!("expected <number>[s|m|h], got {:?}", input))
    })?;
    Ok(Duration::from_secs(value * multiplier))
}

/// Render a duration as the shortest exact `<number>[s|m|h]` string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs % 3_600 == 0 && secs != 0 {
        format!("{}h", secs / 3_600)
    } else if secs % 60 == 0 && secs != 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

mod duration_string {
    use super::{format_duration, parse_duration};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
