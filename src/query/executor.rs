//! Query Executor
//!
//! Validates range bounds, fetches readings from the storage engine and
//! optionally renders them as a CSV export.
//!
//! ```text
//! start/end text → parse_range → StorageEngine::range → RangeResult | ExportFile
//! ```

use crate::export::{self, ExportFile};
use crate::query::error::QueryResult;
use crate::query::parser::parse_range;
use crate::storage::{Reading, StorageEngine};
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Result of a range query
#[derive(Debug, Clone, Serialize)]
pub struct RangeResult {
    /// Number of readings in `data`
    pub total: usize,
    pub data: Vec<Reading>,
}

/// Query executor
pub struct QueryExecutor {
    /// Reference to storage engine
    storage: Arc<StorageEngine>,
}

impl QueryExecutor {
    /// Create a new query executor
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Readings between `start` and `end`, both inclusive
    pub async fn execute(&self, start: Option<&str>, end: Option<&str>) -> QueryResult<RangeResult> {
        let started = Instant::now();
        let range = parse_range(start, end)?;

        let data = self.storage.range(range).await?;

        tracing::debug!(
            start = %range.start,
            end = %range.end,
            rows = data.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Range query executed"
        );

        Ok(RangeResult {
            total: data.len(),
            data,
        })
    }

    /// CSV export of a range, named after its bounds
    pub async fn export_range(&self, start: Option<&str>, end: Option<&str>) -> QueryResult<ExportFile> {
        let range = parse_range(start, end)?;
        let data = self.storage.range(range).await?;

        let file = export::export_range(&data, &range.start, &range.end)?;
        tracing::info!(filename = %file.filename, rows = file.rows, "Range export generated");
        Ok(file)
    }

    /// CSV export of the whole history, named after the generation time
    pub async fn export_all(&self) -> QueryResult<ExportFile> {
        let data = self.storage.all().await?;

        let file = export::export_all(&data, &Local::now().naive_local())?;
        tracing::info!(filename = %file.filename, rows = file.rows, "Full export generated");
        Ok(file)
    }
}
