//! Error taxonomy for the execution engine.

use crate::task::listener::ListenerFailure;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by task registration, strategy selection and execution cycles
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input to a registration call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `run` was invoked without a strategy
    #[error("No execution strategy configured")]
    NotConfigured,

    /// Another cycle is still active on the same manager
    #[error("An execution cycle is already in progress")]
    CycleInProgress,

    /// A task body panicked while a strategy was running it
    #[error("Task '{task}' panicked during execution")]
    TaskPanicked { task: String },

    /// One or more listeners failed during a cycle that otherwise completed
    #[error("{} listener failure(s) during execution cycle", .0.len())]
    ListenerFailures(Vec<ListenerFailure>),

    /// The strategy failed after listeners had already failed on `EXECUTION_START`
    #[error("Execution cycle aborted: {source} ({} listener failure(s))", .listener_failures.len())]
    CycleAborted {
        source: Box<EngineError>,
        listener_failures: Vec<ListenerFailure>,
    },

    #[error("Failed to read config '{path}': {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
