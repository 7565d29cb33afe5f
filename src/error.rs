//! Error Types
//!
//! Errors raised while decoding review data and aggregating statistics.

use thiserror::Error;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Error types for decoding and aggregation
#[derive(Error, Debug)]
pub enum StatsError {
    /// A patch set comment that no patch set of its change owns.
    /// This is a data-integrity violation and aborts the aggregation run.
    #[error("Comment on {file}:{line} has no owning patch set in change {change}")]
    OrphanComment { change: String, file: String, line: u32 },

    /// Malformed input data
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Output consumer failure
    #[error("Output error: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StatsError {
    /// Create an orphan comment error
    pub fn orphan_comment<S: Into<String>, F: Into<String>>(change: S, file: F, line: u32) -> Self {
        Self::OrphanComment { change: change.into(), file: file.into(), line }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse { message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an output error
    pub fn output<S: Into<String>>(message: S) -> Self {
        Self::Output { message: message.into() }
    }

    /// Whether the error signals corrupted input rather than an environment problem
    pub fn is_data_integrity_error(&self) -> bool {
        matches!(self, Self::OrphanComment { .. })
    }
}
