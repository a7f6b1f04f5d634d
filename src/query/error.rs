//! Query error types
//!
//! Defines all error conditions that can occur during range queries and exports.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Missing or unparseable range bound (caller error)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
