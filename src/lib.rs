//! # imulog
//!
//! IMU telemetry recorder. A sensor device streams three-axis accelerometer
//! readings over a WebSocket; the recorder stamps each one on arrival, keeps
//! the most recent in memory, appends every one to a durable history, and
//! serves range queries and CSV exports over HTTP.
//!
//! ## Features
//!
//! - **Two history backends**: append-only CSV log or SQLite, one contract
//! - **Crash-tolerant recovery**: torn or malformed log rows are skipped
//! - **Monotonic arrival times**: stored order is time order
//! - **CSV export**: range or full history, re-loadable as a log
//!
//! ## Modules
//!
//! - [`storage`]: History store backends and the storage engine
//! - [`ingest`]: Frame decoding and per-connection ingestion sessions
//! - [`query`]: Range bound parsing and query execution
//! - [`export`]: CSV rendering and download filenames
//! - [`api`]: HTTP server with Axum
//! - [`websocket`]: Device WebSocket adapter
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imulog::storage::*;
//! use imulog::query::QueryExecutor;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Arc::new(StorageEngine::new(StorageConfig::default()).await?);
//!
//!     engine.record(0.12, -0.50, 9.81).await?;
//!     println!("latest: {:?}", engine.latest());
//!
//!     let executor = QueryExecutor::new(Arc::clone(&engine));
//!     let result = executor
//!         .execute(Some("2024-05-01T00:00"), Some("2024-05-01T23:59"))
//!         .await?;
//!     println!("Found {} readings", result.total);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod query;
pub mod storage;
pub mod websocket;

// Re-export top-level types for convenience
pub use storage::{
    Backend, HistoryStats, HistoryStore, Reading, StorageConfig, StorageEngine, StorageError,
    StorageResult, TimeRange,
};

pub use ingest::{decode_frame, DecodeError, FrameSource, ImuFrame, IngestionSession, SessionStats};

pub use query::{QueryError, QueryExecutor, RangeResult};

pub use export::ExportFile;

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::{device_socket_handler, WebSocketSource};

pub use config::{Config, ConfigError, LoggingConfig};
