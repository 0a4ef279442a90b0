//! Error taxonomy for the extraction and transformation stages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering, extracting or transforming
/// source records. Store failures are reported through `anyhow` at the
/// store boundary instead.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Root directory not found: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Invalid file pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at {file:?}:{line}: {reason}")]
    MalformedRecord {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Expected exactly one catalog record in {file:?}, found {count}")]
    Shape { file: PathBuf, count: usize },

    #[error("Record {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Record {index} has an out-of-range timestamp {ts}")]
    Timestamp { index: usize, ts: i64 },
}
