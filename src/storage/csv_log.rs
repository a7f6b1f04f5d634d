//! CSV history log backend
//!
//! A single text file with header `time,ax,ay,az` and one row per reading,
//! appended in arrival order. The whole history is also kept in memory
//! (loaded by the [`RecoveryLoader`] at open) and reads are served from it.
//!
//! Every append is written and flushed before it is acknowledged. Appends and
//! `clear` take the write lock, reads take the read lock, so a range scan
//! never sees half of an append.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::history::{Backend, HistoryStore};
use crate::storage::recovery::RecoveryLoader;
use crate::storage::types::{format_timestamp, parse_stored_timestamp, Reading, TimeRange};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Column names, in file order
pub const CSV_HEADER: [&str; 4] = ["time", "ax", "ay", "az"];

/// One row of the history log and of CSV exports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRow {
    pub time: String,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
}

impl From<&Reading> for CsvRow {
    fn from(reading: &Reading) -> Self {
        Self {
            time: format_timestamp(&reading.timestamp),
            ax: reading.ax,
            ay: reading.ay,
            az: reading.az,
        }
    }
}

impl TryFrom<CsvRow> for Reading {
    type Error = StorageError;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let timestamp = parse_stored_timestamp(&row.time)
            .map_err(|e| StorageError::Corruption(format!("bad timestamp '{}': {}", row.time, e)))?;
        Ok(Reading::new(row.ax, row.ay, row.az, timestamp))
    }
}

/// Durability of each append
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Flush to the OS after every append
    Flush,
    /// Flush and fsync after every append
    Fsync,
}

impl Default for SyncMode {
    fn default() -> Self {
        SyncMode::Flush
    }
}

struct LogState {
    /// In-memory copy of the log, in file order
    readings: Vec<Reading>,
    /// Open lazily on first append, dropped on clear or write failure
    writer: Option<csv::Writer<File>>,
}

/// File-backed history store
pub struct CsvLogStore {
    path: PathBuf,
    sync_mode: SyncMode,
    state: RwLock<LogState>,
}

impl CsvLogStore {
    /// Open the log at `path`, loading any existing rows
    pub fn open(path: impl AsRef<Path>, sync_mode: SyncMode) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let report = RecoveryLoader::load(&path)?;

        // A torn last row must not swallow the next append
        if report.needs_newline {
            let mut file = OpenOptions::new().append(true).open(&path)?;
            file.write_all(b"\n")?;
            file.flush()?;
        }

        tracing::info!(
            path = %path.display(),
            loaded = report.readings.len(),
            skipped = report.skipped,
            "Opened CSV history log"
        );

        Ok(Self {
            path,
            sync_mode,
            state: RwLock::new(LogState {
                readings: report.readings,
                writer: None,
            }),
        })
    }

    fn read_state(&self) -> StorageResult<RwLockReadGuard<'_, LogState>> {
        self.state
            .read()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire log read lock: {}", e)))
    }

    fn write_state(&self) -> StorageResult<RwLockWriteGuard<'_, LogState>> {
        self.state
            .write()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire log write lock: {}", e)))
    }

    /// Open the file for appending, writing the header if the file is new
    fn open_writer(&self) -> StorageResult<csv::Writer<File>> {
        let is_new = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer.write_record(CSV_HEADER)?;
            writer.flush()?;
        }

        Ok(writer)
    }

    fn write_row(&self, state: &mut LogState, reading: &Reading) -> StorageResult<()> {
        if state.writer.is_none() {
            state.writer = Some(self.open_writer()?);
        }

        if let Some(writer) = state.writer.as_mut() {
            writer.serialize(CsvRow::from(reading))?;
            writer.flush()?;
            if self.sync_mode == SyncMode::Fsync {
                writer.get_ref().sync_data()?;
            }
        }

        Ok(())
    }
}

impl HistoryStore for CsvLogStore {
    fn backend(&self) -> Backend {
        Backend::Csv
    }

    fn append(&self, reading: &Reading) -> StorageResult<()> {
        let mut state = self.write_state()?;

        if let Err(e) = self.write_row(&mut state, reading) {
            // Reopen on the next append rather than reuse a failed handle
            state.writer = None;
            return Err(e);
        }

        state.readings.push(reading.clone());
        Ok(())
    }

    fn range(&self, range: &TimeRange) -> StorageResult<Vec<Reading>> {
        let state = self.read_state()?;
        Ok(state
            .readings
            .iter()
            .filter(|r| range.contains(&r.timestamp))
            .cloned()
            .collect())
    }

    fn all(&self) -> StorageResult<Vec<Reading>> {
        Ok(self.read_state()?.readings.clone())
    }

    fn count(&self) -> StorageResult<u64> {
        Ok(self.read_state()?.readings.len() as u64)
    }

    fn first_timestamp(&self) -> StorageResult<Option<NaiveDateTime>> {
        Ok(self.read_state()?.readings.first().map(|r| r.timestamp))
    }

    fn last_timestamp(&self) -> StorageResult<Option<NaiveDateTime>> {
        Ok(self.read_state()?.readings.last().map(|r| r.timestamp))
    }

    fn clear(&self) -> StorageResult<()> {
        let mut state = self.write_state()?;

        // Close the handle before removing the file
        state.writer = None;

        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        state.readings.clear();
        tracing::info!(path = %self.path.display(), "Cleared CSV history log");
        Ok(())
    }
}
