//! Storage error types
//!
//! Defines all errors that can occur in the history store layer.

use thiserror::Error;

/// Errors that can occur in the history store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV log read or write failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// SQLite backend failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored data could not be interpreted (bad timestamp, bad row)
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),

    /// Blocking store task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Task(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::Corruption("bad timestamp 'x'".to_string());
        assert_eq!(err.to_string(), "Corrupt data: bad timestamp 'x'");

        let err = StorageError::Lock("poisoned".to_string());
        assert_eq!(err.to_string(), "Lock error: poisoned");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::Io(_)));
    }
}
