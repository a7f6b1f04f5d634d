//! History store contract
//!
//! Every backend implements [`HistoryStore`] and must agree exactly on its
//! observable behaviour: insertion order, inclusive range bounds, empty
//! results instead of errors, and a `clear` that survives a restart.
//!
//! Methods are synchronous and take `&self`; each backend hides its own
//! locking. The engine runs them on the blocking thread pool.

use crate::storage::error::StorageResult;
use crate::storage::types::{HistoryStats, Reading, TimeRange};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Durable, range-queryable collection of readings
pub trait HistoryStore: Send + Sync {
    /// Which backend this is
    fn backend(&self) -> Backend;

    /// Durably record one reading. On `Ok`, the reading is visible to every
    /// later read and survives a reopen.
    fn append(&self, reading: &Reading) -> StorageResult<()>;

    /// Readings with `start <= timestamp <= end`, in insertion order
    fn range(&self, range: &TimeRange) -> StorageResult<Vec<Reading>>;

    /// Every reading, in insertion order
    fn all(&self) -> StorageResult<Vec<Reading>>;

    fn count(&self) -> StorageResult<u64>;

    fn first_timestamp(&self) -> StorageResult<Option<NaiveDateTime>>;

    fn last_timestamp(&self) -> StorageResult<Option<NaiveDateTime>>;

    /// Remove every reading, including from the durable medium
    fn clear(&self) -> StorageResult<()>;

    /// Count and bounds in one call
    fn stats(&self) -> StorageResult<HistoryStats> {
        Ok(HistoryStats {
            total_records: self.count()?,
            first_record: self.first_timestamp()?,
            last_record: self.last_timestamp()?,
        })
    }
}

/// Available history backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Flat CSV log with an in-memory copy
    Csv,
    /// SQLite table queried directly
    Sqlite,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Csv
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Csv => write!(f, "csv"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "file" => Ok(Backend::Csv),
            "sqlite" | "db" => Ok(Backend::Sqlite),
            other => Err(format!("unknown backend '{}' (expected csv or sqlite)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv_log::{CsvLogStore, SyncMode};
    use crate::storage::sqlite::SqliteStore;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn reading_at(secs: i64, v: f64) -> Reading {
        Reading::new(v, v + 0.5, v - 0.5, base() + Duration::seconds(secs))
    }

    /// One fresh instance of every backend
    fn backends() -> Vec<(Box<dyn HistoryStore>, TempDir)> {
        let csv_dir = tempfile::tempdir().unwrap();
        let csv = CsvLogStore::open(csv_dir.path().join("history.csv"), SyncMode::Flush).unwrap();

        let db_dir = tempfile::tempdir().unwrap();
        let sqlite = SqliteStore::open(db_dir.path().join("history.db")).unwrap();

        vec![(Box::new(csv), csv_dir), (Box::new(sqlite), db_dir)]
    }

    #[test]
    fn test_contract_preserves_insertion_order() {
        for (store, _dir) in backends() {
            let readings: Vec<Reading> = (0..10).map(|i| reading_at(i, i as f64)).collect();
            for r in &readings {
                store.append(r).unwrap();
            }

            assert_eq!(store.all().unwrap(), readings, "backend {}", store.backend());

            let covering = TimeRange::new(base() - Duration::hours(1), base() + Duration::hours(1));
            assert_eq!(store.range(&covering).unwrap(), readings, "backend {}", store.backend());
        }
    }

    #[test]
    fn test_contract_range_bounds_are_inclusive() {
        for (store, _dir) in backends() {
            for i in 0..5 {
                store.append(&reading_at(i * 10, i as f64)).unwrap();
            }

            // exactly on the 10s and 30s readings
            let range = TimeRange::new(base() + Duration::seconds(10), base() + Duration::seconds(30));
            let hits = store.range(&range).unwrap();

            let values: Vec<f64> = hits.iter().map(|r| r.ax).collect();
            assert_eq!(values, vec![1.0, 2.0, 3.0], "backend {}", store.backend());
        }
    }

    #[test]
    fn test_contract_empty_and_inverted_ranges() {
        for (store, _dir) in backends() {
            store.append(&reading_at(0, 1.0)).unwrap();

            let later = TimeRange::new(base() + Duration::days(1), base() + Duration::days(2));
            assert!(store.range(&later).unwrap().is_empty());

            let inverted = TimeRange::new(base() + Duration::hours(1), base() - Duration::hours(1));
            assert!(store.range(&inverted).unwrap().is_empty());
        }
    }

    #[test]
    fn test_contract_count_and_bounds() {
        for (store, _dir) in backends() {
            assert_eq!(store.count().unwrap(), 0);
            assert_eq!(store.first_timestamp().unwrap(), None);
            assert_eq!(store.last_timestamp().unwrap(), None);

            store.append(&reading_at(5, 1.0)).unwrap();
            store.append(&reading_at(9, 2.0)).unwrap();

            let stats = store.stats().unwrap();
            assert_eq!(stats.total_records, 2);
            assert_eq!(stats.first_record, Some(base() + Duration::seconds(5)));
            assert_eq!(stats.last_record, Some(base() + Duration::seconds(9)));
        }
    }

    #[test]
    fn test_contract_clear() {
        for (store, _dir) in backends() {
            for i in 0..3 {
                store.append(&reading_at(i, i as f64)).unwrap();
            }

            store.clear().unwrap();

            assert_eq!(store.count().unwrap(), 0);
            assert!(store.all().unwrap().is_empty());
            let any = TimeRange::new(base() - Duration::days(1), base() + Duration::days(1));
            assert!(store.range(&any).unwrap().is_empty());

            // usable again after a clear
            store.append(&reading_at(100, 7.0)).unwrap();
            assert_eq!(store.count().unwrap(), 1);
        }
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("csv".parse::<Backend>().unwrap(), Backend::Csv);
        assert_eq!("SQLite".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert!("postgres".parse::<Backend>().is_err());
        assert_eq!(Backend::Sqlite.to_string(), "sqlite");
    }
}
