//! Core error types for taskfocus-core.
//!
//! Remote-write failures are never fatal to a running session; they surface
//! as [`GatewayError`] values which the session turns into notifications.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskStatus;

/// Core error type for taskfocus-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote task service errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Rejected session commands
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// A session command was rejected. State is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no task is selected")]
    NoTaskSelected,

    #[error("task {task_id} is {status}, it must be In Progress to run the timer")]
    TaskNotInProgress { task_id: String, status: TaskStatus },

    #[error("cannot switch session kind while the timer is running")]
    SwitchWhileRunning,

    #[error("cannot change task status while the timer is running")]
    ActionWhileRunning,

    #[error("task {task_id} is already {status}")]
    AlreadyInStatus { task_id: String, status: TaskStatus },

    #[error("session is closed")]
    Closed,
}

/// Errors talking to the task service.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("{operation} failed with HTTP {status}")]
    Status { operation: &'static str, status: u16 },

    /// The access token was rejected
    #[error("not authorized, sign in again")]
    Unauthorized,

    /// Unknown task id
    #[error("task not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Base URL is malformed or cannot carry endpoint paths
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Failure injected by the in-memory gateway
    #[error("{0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_name_the_task() {
        let err = SessionError::TaskNotInProgress {
            task_id: "t1".into(),
            status: TaskStatus::Todo,
        };
        assert_eq!(
            err.to_string(),
            "task t1 is Todo, it must be In Progress to run the timer"
        );
    }

    #[test]
    fn errors_convert_into_core_error() {
        let core: CoreError = GatewayError::Unauthorized.into();
        assert!(matches!(core, CoreError::Gateway(GatewayError::Unauthorized)));

        let core: CoreError = ConfigError::UnknownKey("timer.x".into()).into();
        assert_eq!(core.to_string(), "Configuration error: unknown config key: timer.x");
    }
}
