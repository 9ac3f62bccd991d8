//! Error types for kickoff operations.
//!
//! This module defines [`KickoffError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Step failures caused by the site are *not* errors: they come back as a
//!   failed [`StepResult`](crate::steps::StepResult) and are retried later
//! - Storage failures are fatal to an invocation and surface as
//!   [`KickoffError::Storage`]
//! - Use `anyhow::Error` (via `KickoffError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kickoff operations.
#[derive(Debug, Error)]
pub enum KickoffError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The progress store could not be read or written.
    #[error("Cannot determine progress ({path}): {message}")]
    Storage { path: PathBuf, message: String },

    /// The persisted run was started against a different step sequence.
    #[error(
        "Step sequence changed since the run began (recorded {recorded}, now {current}); run `kickoff reset` to start over"
    )]
    RegistryChanged { recorded: String, current: String },

    /// An external command could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KickoffError {
    /// Build a storage error for the given location.
    pub fn storage(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for kickoff operations.
pub type Result<T> = std::result::Result<T, KickoffError>;
