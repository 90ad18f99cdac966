//! Error types for websim-core

use thiserror::Error;

/// Kind of core error, used for coarse classification in logs and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or incomplete configuration
    Config,
    /// Scheduler-level failure
    Scheduler,
    /// Worker pool failure
    Worker,
    /// Shutdown in progress
    Shutdown,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Config => "config",
            ErrorKind::Scheduler => "scheduler",
            ErrorKind::Worker => "worker",
            ErrorKind::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// Core error type
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    /// Error classification
    pub kind: ErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl Error {
    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Config,
            message: message.into(),
        }
    }

    /// A required collaborator was not supplied to a builder
    pub fn missing_component(name: &str) -> Self {
        Self {
            kind: ErrorKind::Config,
            message: format!("missing required component: {}", name),
        }
    }

    /// Scheduler-level failure
    pub fn scheduler(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Scheduler,
            message: message.into(),
        }
    }

    /// Worker-level failure
    pub fn worker(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Worker,
            message: message.into(),
        }
    }

    /// Shutdown requested
    pub fn shutdown() -> Self {
        Self {
            kind: ErrorKind::Shutdown,
            message: "shutdown requested".to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
