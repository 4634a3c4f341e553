//! Core error types for proctor-core.
//!
//! Every failure in this crate is scoped to a session or a single sample.
//! Perception failures are recovered inside the scheduler and only surface
//! as diagnostics; configuration errors fail fast at session construction;
//! transport errors are handed back to the caller untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for proctor-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Report submission or retrieval failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The monitoring task ended abnormally
    #[error("Monitoring task failed: {0}")]
    Task(String),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
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

    /// No object class is flagged as suspicious
    #[error("Suspicious object set is empty")]
    EmptySuspiciousSet,

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Failure of a single perception call. Never fatal: the sample is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerceptionError {
    /// The video stream has not produced a usable frame yet
    #[error("frame not ready")]
    FrameNotReady,

    /// The model call failed
    #[error("perception failed: {0}")]
    Failed(String),

    /// The model call did not return in time
    #[error("perception timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },
}

/// Report store errors. Carry no partial state and are never retried here.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection or request failure
    #[error("Network error: {0}")]
    Network(String),

    /// The store answered with a non-success status
    #[error("Server responded with {status}: {message}")]
    Server { status: u16, message: String },

    /// No report stored under that identifier
    #[error("No report found with id '{id}'")]
    NotFound { id: String },

    /// Response body did not match the report shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Base URL could not be used to build a request
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Parse(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
