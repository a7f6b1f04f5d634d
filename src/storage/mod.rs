//! imulog Storage
//!
//! This module provides the history and latest-reading storage:
//!
//! - **types**: Core data structures (Reading, TimeRange, HistoryStats)
//! - **history**: The `HistoryStore` contract shared by all backends
//! - **csv_log**: Flat CSV log backend with an in-memory copy
//! - **sqlite**: SQLite table backend
//! - **recovery**: Startup loader for the CSV log
//! - **latest**: Single-slot register for the most recent reading
//! - **engine**: Store context orchestrating all of the above
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Frame values → Timestamp → Latest register → History append (flush)
//!
//! Read Path:
//!   Range / All / Stats → History backend → Readings in time order
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use imulog::storage::{Backend, StorageConfig, StorageEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StorageConfig::new("./data").backend(Backend::Sqlite);
//!     let engine = StorageEngine::new(config).await?;
//!
//!     engine.record(0.01, -0.02, 9.81).await?;
//!
//!     println!("{}", engine.stats().await?);
//!     Ok(())
//! }
//! ```

pub mod csv_log;
pub mod engine;
pub mod error;
pub mod history;
pub mod latest;
pub mod recovery;
pub mod sqlite;
pub mod types;

// Re-export commonly used types
pub use csv_log::{CsvLogStore, CsvRow, SyncMode, CSV_HEADER};
pub use engine::{open_history, StorageConfig, StorageEngine};
pub use error::{StorageError, StorageResult};
pub use history::{Backend, HistoryStore};
pub use latest::LatestRegister;
pub use recovery::{RecoveryLoader, RecoveryReport};
pub use sqlite::SqliteStore;
pub use types::{
    format_timestamp, parse_stored_timestamp, HistoryStats, Reading, TimeRange, TIMESTAMP_FORMAT,
};
