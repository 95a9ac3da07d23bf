//! Operation Log Store Error Types

use std::io;
use thiserror::Error;

/// Operation log store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The journal (or its directory) could not be read or written.
    #[error("storage unavailable: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("journal serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A journal line could not be parsed during replay.
    #[error("journal corrupt at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// Blank input text, rejected before any write.
    #[error("text must not be empty")]
    EmptyText,
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
