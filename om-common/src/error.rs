//! Common error types for OpenMedicaid

use std::path::PathBuf;

use thiserror::Error;

/// Common result type for OpenMedicaid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the site crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixture file exists but does not match the expected shape
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
