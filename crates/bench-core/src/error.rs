//! Error types for the checkpoint benchmark

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the benchmark Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the checkpoint benchmark
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Read-only runs need pre-existing checkpoint directories
    #[error(
        "Read-only mode requires at least {required} checkpoint directories under {}. Found {found}.",
        .root.display()
    )]
    InsufficientCheckpoints {
        required: usize,
        found: usize,
        root: PathBuf,
    },

    // Storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Build an `InvalidConfig` error from anything printable
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if this error was raised before any I/O was scheduled
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig { .. } | Error::InsufficientCheckpoints { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
