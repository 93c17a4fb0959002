//! Storage error types

use common::SeriesKind;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The series has no backing data at all
    #[error("{} series not found", .0.symbol())]
    NotFound(SeriesKind),

    /// An upsert was called with no rows
    #[error("No rows provided")]
    EmptyBatch,

    /// A stored row could not be decoded
    #[error("Malformed {kind} row at line {line}: {message}")]
    Malformed {
        kind: SeriesKind,
        line: u64,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A blocking file task was cancelled or panicked
    #[error("Storage task failed: {0}")]
    Task(String),
}
