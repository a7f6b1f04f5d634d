//! imulog storage engine
//!
//! The one store context of the process. It owns the latest-state register
//! and the history backend, and is shared by `Arc` with the ingestion worker
//! and every request handler:
//! - Write path: frame values → timestamp → register → history append
//! - Read path: range / all / stats → history backend (blocking pool)
//!
//! Writers are serialized by an async mutex that also guards the last
//! assigned timestamp, so insertion order always equals time order.

use crate::storage::csv_log::{CsvLogStore, SyncMode};
use crate::storage::error::StorageResult;
use crate::storage::history::{Backend, HistoryStore};
use crate::storage::latest::LatestRegister;
use crate::storage::sqlite::SqliteStore;
use crate::storage::types::{HistoryStats, Reading, TimeRange};
use chrono::{Local, NaiveDateTime, SubsecRound};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Configuration for the storage engine
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// History backend to open
    pub backend: Backend,
    /// Directory holding the history file or database
    pub data_dir: PathBuf,
    /// Durability of CSV appends
    pub sync_mode: SyncMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Csv,
            data_dir: PathBuf::from("imulog_data"),
            sync_mode: SyncMode::Flush,
        }
    }
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Builder: select the backend
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Get path to the CSV history log
    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join("imu_data_history.csv")
    }

    /// Get path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("imu_history.db")
    }

    /// Path of whichever backend is selected
    pub fn history_path(&self) -> PathBuf {
        match self.backend {
            Backend::Csv => self.csv_path(),
            Backend::Sqlite => self.sqlite_path(),
        }
    }
}

/// Open the configured history backend
pub fn open_history(config: &StorageConfig) -> StorageResult<Arc<dyn HistoryStore>> {
    std::fs::create_dir_all(&config.data_dir)?;

    let store: Arc<dyn HistoryStore> = match config.backend {
        Backend::Csv => Arc::new(CsvLogStore::open(config.csv_path(), config.sync_mode)?),
        Backend::Sqlite => Arc::new(SqliteStore::open(config.sqlite_path())?),
    };

    Ok(store)
}

/// The imulog storage engine
pub struct StorageEngine {
    /// Durable history
    store: Arc<dyn HistoryStore>,
    /// Most recent reading
    latest: LatestRegister,
    /// Last assigned timestamp; held for the whole write path
    write_path: Mutex<Option<NaiveDateTime>>,
}

impl StorageEngine {
    /// Open the configured backend (running recovery for the CSV log)
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let store = tokio::task::spawn_blocking(move || open_history(&config)).await??;
        Self::with_store(store).await
    }

    /// Wrap an already-open history backend
    pub async fn with_store(store: Arc<dyn HistoryStore>) -> StorageResult<Self> {
        let stats = {
            let store = Arc::clone(&store);
            tokio::task::spawn_blocking(move || store.stats()).await??
        };

        tracing::info!(backend = %store.backend(), %stats, "History store ready");

        Ok(Self {
            store,
            latest: LatestRegister::new(),
            write_path: Mutex::new(stats.last_record),
        })
    }

    /// Run a store operation on the blocking pool
    async fn run<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn HistoryStore) -> StorageResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref())).await?
    }

    /// Next arrival timestamp: local wall clock at microsecond precision,
    /// never earlier than the last one
    fn next_timestamp(last: &mut Option<NaiveDateTime>) -> NaiveDateTime {
        // stored text carries six fractional digits; keep memory and disk identical
        let now = Local::now().naive_local().trunc_subsecs(6);
        let ts = match *last {
            Some(prev) if now < prev => prev,
            _ => now,
        };
        *last = Some(ts);
        ts
    }

    /// Record one reading: stamp it, publish it to the register, append it.
    ///
    /// The register is updated before the append and stays updated even when
    /// the append fails; the error is returned for the caller to log.
    pub async fn record(&self, ax: f64, ay: f64, az: f64) -> StorageResult<Reading> {
        let mut last = self.write_path.lock().await;

        let reading = Reading::new(ax, ay, az, Self::next_timestamp(&mut last));
        self.latest.set(reading.clone());

        let to_store = reading.clone();
        self.run(move |store| store.append(&to_store)).await?;

        Ok(reading)
    }

    /// Most recent reading, `None` before the first ingestion
    pub fn latest(&self) -> Option<Reading> {
        self.latest.get()
    }

    /// Readings inside the inclusive range, in time order
    pub async fn range(&self, range: TimeRange) -> StorageResult<Vec<Reading>> {
        self.run(move |store| store.range(&range)).await
    }

    /// Full history, in time order
    pub async fn all(&self) -> StorageResult<Vec<Reading>> {
        self.run(|store| store.all()).await
    }

    pub async fn count(&self) -> StorageResult<u64> {
        self.run(|store| store.count()).await
    }

    /// Count plus first and last timestamps
    pub async fn stats(&self) -> StorageResult<HistoryStats> {
        self.run(|store| store.stats()).await
    }

    /// Remove the whole history. Waits for any in-flight append.
    pub async fn clear(&self) -> StorageResult<()> {
        let _writers = self.write_path.lock().await;
        self.run(|store| store.clear()).await
    }

    pub fn backend(&self) -> Backend {
        self.store.backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::StorageError;
    use chrono::Timelike;
    use tempfile::tempdir;

    async fn create_test_engine(backend: Backend) -> (StorageEngine, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path()).backend(backend);
        let engine = StorageEngine::new(config).await.unwrap();
        (engine, dir)
    }

    /// Backend whose appends always fail
    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn backend(&self) -> Backend {
            Backend::Csv
        }
        fn append(&self, _reading: &Reading) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
        fn range(&self, _range: &TimeRange) -> StorageResult<Vec<Reading>> {
            Ok(Vec::new())
        }
        fn all(&self) -> StorageResult<Vec<Reading>> {
            Ok(Vec::new())
        }
        fn count(&self) -> StorageResult<u64> {
            Ok(0)
        }
        fn first_timestamp(&self) -> StorageResult<Option<NaiveDateTime>> {
            Ok(None)
        }
        fn last_timestamp(&self) -> StorageResult<Option<NaiveDateTime>> {
            Ok(None)
        }
        fn clear(&self) -> StorageResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_engine_creation() {
        let (engine, _dir) = create_test_engine(Backend::Csv).await;
        assert_eq!(engine.count().await.unwrap(), 0);
        assert!(engine.latest().is_none());
        assert_eq!(engine.backend(), Backend::Csv);
    }

    #[tokio::test]
    async fn test_record_updates_latest_and_history() {
        for backend in [Backend::Csv, Backend::Sqlite] {
            let (engine, _dir) = create_test_engine(backend).await;

            let first = engine.record(1.0, 2.0, 3.0).await.unwrap();
            let second = engine.record(4.0, 5.0, 6.0).await.unwrap();

            assert_eq!(engine.latest(), Some(second.clone()));
            assert_eq!(engine.all().await.unwrap(), vec![first, second]);
        }
    }

    #[tokio::test]
    async fn test_reported_time_bounds_its_own_reading() {
        for backend in [Backend::Csv, Backend::Sqlite] {
            let (engine, _dir) = create_test_engine(backend).await;

            let reading = engine.record(1.5, -2.5, 9.75).await.unwrap();
            assert_eq!(reading.timestamp.nanosecond() % 1_000, 0);

            let text = reading.time_text();
            let t = crate::storage::parse_stored_timestamp(&text).unwrap();
            let hits = engine.range(TimeRange::new(t, t)).await.unwrap();
            assert_eq!(hits, vec![reading.clone()], "backend {backend}");

            assert_eq!(engine.all().await.unwrap(), vec![reading]);
        }
    }

    #[tokio::test]
    async fn test_csv_reading_unchanged_across_restart() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path());

        let recorded = {
            let engine = StorageEngine::new(config.clone()).await.unwrap();
            engine.record(0.25, 0.5, 0.75).await.unwrap()
        };

        let engine = StorageEngine::new(config).await.unwrap();
        assert_eq!(engine.all().await.unwrap(), vec![recorded]);
    }

    #[tokio::test]
    async fn test_timestamps_never_decrease() {
        let (engine, _dir) = create_test_engine(Backend::Sqlite).await;

        for i in 0..50 {
            engine.record(i as f64, 0.0, 0.0).await.unwrap();
        }

        let all = engine.all().await.unwrap();
        assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_failed_append_still_updates_latest() {
        let engine = StorageEngine::with_store(Arc::new(BrokenStore)).await.unwrap();

        let result = engine.record(0.1, 0.2, 0.3).await;
        assert!(result.is_err());

        let latest = engine.latest().unwrap();
        assert_eq!((latest.ax, latest.ay, latest.az), (0.1, 0.2, 0.3));
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let (engine, _dir) = create_test_engine(Backend::Csv).await;

        let first = engine.record(1.0, 1.0, 1.0).await.unwrap();
        let last = engine.record(2.0, 2.0, 2.0).await.unwrap();

        let stats = engine.stats().await.unwrap();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.first_record, Some(first.timestamp));
        assert_eq!(stats.last_record, Some(last.timestamp));

        engine.clear().await.unwrap();
        assert_eq!(engine.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recovery_idempotence() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path());

        let before = {
            let engine = StorageEngine::new(config.clone()).await.unwrap();
            for i in 0..40 {
                engine.record(i as f64, 0.0, -1.0).await.unwrap();
            }
            engine.count().await.unwrap()
        };

        let engine = StorageEngine::new(config).await.unwrap();
        assert_eq!(engine.count().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_clock_resumes_after_stored_history() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path());

        // history stamped a day ahead of the local clock
        let future = Local::now().naive_local().trunc_subsecs(6) + chrono::Duration::days(1);
        {
            let store = CsvLogStore::open(config.csv_path(), SyncMode::Flush).unwrap();
            store.append(&Reading::new(0.0, 0.0, 0.0, future)).unwrap();
        }

        let engine = StorageEngine::new(config).await.unwrap();
        let reading = engine.record(1.0, 1.0, 1.0).await.unwrap();
        assert!(reading.timestamp >= future);
    }
}
