//! Error types with actionable diagnostics
//!
//! Every variant names the offending input and, where the fix is obvious,
//! how to resolve it.

use crate::config::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ganbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the scheduler, the job generator and the summary pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse {path}: {message}\n  → Check YAML syntax at the indicated line")]
    ConfigParseError { path: PathBuf, message: String },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// A benchmark config referenced by the catalog does not exist
    #[error("{model}: {path} not found\n  → Run from the repository root or pass --use-ceph-config")]
    ConfigNotFound { model: String, path: PathBuf },

    /// Model catalog is malformed
    #[error("Model catalog error: {0}")]
    Catalog(String),

    /// Checkpoint storage backend could not be set up
    #[error("Storage error: {0}")]
    Storage(String),

    /// Result file exists but could not be decoded
    #[error("Failed to read result file {path}: {message}")]
    ResultFile { path: PathBuf, message: String },

    /// Shell command could not be spawned
    #[error("Command failed: {0}")]
    Command(String),

    /// IO error with context
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }
}
