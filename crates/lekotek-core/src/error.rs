//! Core error types.
//!
//! Every failure is either a recoverable validation rejection (nothing
//! was mutated) or a storage warning; there is no fatal error class.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lekotek-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Data directory could not be resolved
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors. All are recoverable: reported to the user, no
/// state mutated.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No student with id '{0}'")]
    UnknownStudent(String),

    #[error("No toy with id '{0}'")]
    UnknownToy(String),

    #[error("No borrowed item with id '{0}'")]
    UnknownItem(String),

    #[error("No session with id '{0}'")]
    UnknownSession(String),

    #[error("No class named '{0}'")]
    UnknownClass(String),

    #[error("No not-returned record with id '{0}'")]
    UnknownRecord(String),

    #[error("A class named '{0}' already exists")]
    DuplicateClass(String),

    /// Inside the warning window: borrows stop, returns keep working.
    #[error("Borrowing is blocked: less than {warning_minutes} minutes left of the session")]
    BorrowingBlocked { warning_minutes: u32 },

    #[error("{student_name} has already borrowed a toy")]
    AlreadyBorrowed { student_name: String },

    #[error("{student_name} is blocked: a toy was not returned")]
    StudentBlocked { student_name: String },

    #[error("'{toy_name}' is out of stock")]
    OutOfStock { toy_name: String },

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid session window: end time {end} must be after start time {start}")]
    InvalidTimeRange { start: String, end: String },

    #[error("Invalid admin password")]
    InvalidPassword,
}

/// Import errors. Returned as values, never panicked.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Could not read the file: not valid JSON ({0})")]
    InvalidJson(String),

    #[error("Invalid data structure: expected an exported data object")]
    InvalidShape,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
