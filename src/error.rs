//! Error types for lexdesk.

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Persistence collaborator errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Operator input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{field}' {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Time tracker lifecycle errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("a tracking session is already running")]
    AlreadyRunning,

    #[error("no tracking session is running")]
    NotRunning,

    #[error("time tracking needs a running tokio runtime")]
    NoRuntime,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
