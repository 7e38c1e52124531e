// src/error.rs

//! Error types for recipe cooking and tasting

use thiserror::Error;

/// Errors raised while reading, cooking or tasting a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// Recipe configuration is unusable (missing version, bad option value, ...)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Recipe or manifest text could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The external build tool failed during configure or build
    #[error("{step} failed: {message}")]
    BuildError { step: &'static str, message: String },

    /// The test runner or the smoke-test program failed
    #[error("Test failed: {0}")]
    TestError(String),

    /// Declared requirements could not be satisfied
    #[error("Unresolved requirements: {0}")]
    ResolutionError(String),

    /// A cook step was entered out of order
    #[error("Invalid step transition from {from} to {to}")]
    InvalidStateError { from: &'static str, to: &'static str },

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for cookbook operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error belongs to the configuration class
    pub fn is_config(&self) -> bool {
        matches!(self, Error::ConfigError(_) | Error::ParseError(_))
    }
}
