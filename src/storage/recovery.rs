//! Recovery loader for the CSV history log
//!
//! Rebuilds the in-memory history from the durable log at startup. Rows are
//! matched to columns by header name. A row that fails to parse is logged and
//! skipped so that a damaged tail never hides the valid rows before it.

use crate::storage::csv_log::CsvRow;
use crate::storage::error::StorageResult;
use crate::storage::types::Reading;
use std::path::Path;

/// Outcome of loading a history log
#[derive(Debug, Default)]
pub struct RecoveryReport {
    /// Valid readings, in file order
    pub readings: Vec<Reading>,
    /// Rows that could not be parsed
    pub skipped: usize,
    /// File is non-empty and its last byte is not a newline
    pub needs_newline: bool,
}

/// Loads a CSV history log into memory
pub struct RecoveryLoader;

impl RecoveryLoader {
    /// Parse the log at `path`. A missing file yields an empty report.
    pub fn load(path: &Path) -> StorageResult<RecoveryReport> {
        if !path.exists() {
            return Ok(RecoveryReport::default());
        }

        let bytes = std::fs::read(path)?;
        let mut report = Self::load_bytes(&bytes);

        if report.skipped > 0 {
            tracing::warn!(
                path = %path.display(),
                loaded = report.readings.len(),
                skipped = report.skipped,
                "History log contained unreadable rows"
            );
        }

        report.needs_newline = bytes.last().map(|b| *b != b'\n').unwrap_or(false);
        Ok(report)
    }

    /// Parse log contents already in memory
    pub fn load_bytes(bytes: &[u8]) -> RecoveryReport {
        let mut report = RecoveryReport::default();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = match reader.headers() {
            Ok(h) => h.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "History log header is unreadable");
                return report;
            }
        };

        for result in reader.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable history row");
                    report.skipped += 1;
                    continue;
                }
            };

            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let parsed = record
                .deserialize::<CsvRow>(Some(&headers))
                .map_err(|e| e.to_string())
                .and_then(|row| Reading::try_from(row).map_err(|e| e.to_string()));

            match parsed {
                Ok(reading) => report.readings.push(reading),
                Err(e) => {
                    tracing::warn!(line, error = %e, "Skipping malformed history row");
                    report.skipped += 1;
                }
            }
        }

        report
    }
}
