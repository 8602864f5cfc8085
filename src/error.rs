// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Any of these aborts the run before a report is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// Repository could not be opened or walked
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Classifier configuration file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Classifier configuration file is not valid YAML for the expected shape
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Classifier configuration parsed but violates a rule
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// Unrecognized breakdown granularity
    #[error("invalid breakdown type: {value} (must be: year, quarter, month, week)")]
    InvalidGranularity { value: String },

    /// Date filter is not `YYYY-MM-DD`
    #[error("invalid date {value:?}, expected YYYY-MM-DD: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Worker threads could not be started
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Report could not be written
    #[error("failed to render report: {0}")]
    Render(#[from] std::fmt::Error),
}
