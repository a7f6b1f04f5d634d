//! SQLite history backend
//!
//! One row per reading in a `readings` table with an auto-assigned key and an
//! indexed `created_at` column holding the canonical timestamp text. Reads
//! go straight to the database, so there is nothing to recover at startup.
//!
//! The connection sits behind a mutex: every statement, including `clear`,
//! runs alone.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::history::{Backend, HistoryStore};
use crate::storage::types::{format_timestamp, parse_stored_timestamp, Reading, TimeRange};
use chrono::NaiveDateTime;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Current schema version, kept in `PRAGMA user_version`
pub const SCHEMA_VERSION: i32 = 1;

/// Create tables on a fresh database
fn initialize(conn: &Connection) -> StorageResult<()> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version == 0 {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ax REAL NOT NULL,
                ay REAL NOT NULL,
                az REAL NOT NULL,
                created_at TEXT NOT NULL
                    DEFAULT (strftime('%Y-%m-%dT%H:%M:%f', 'now', 'localtime'))
            );
            CREATE INDEX IF NOT EXISTS idx_readings_created_at ON readings(created_at);
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    } else if version > SCHEMA_VERSION {
        return Err(StorageError::Config(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    Ok(())
}

fn row_to_reading(row: &Row<'_>) -> rusqlite::Result<Reading> {
    let text: String = row.get(3)?;
    let timestamp = parse_stored_timestamp(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    Ok(Reading::new(row.get(0)?, row.get(1)?, row.get(2)?, timestamp))
}

fn row_to_timestamp(row: &Row<'_>) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(0)?;
    parse_stored_timestamp(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Database-backed history store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!(path = %path.display(), "Opening SQLite history database");
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire database lock: {}", e)))
    }

    fn bound(&self, sql: &str) -> StorageResult<Option<NaiveDateTime>> {
        let conn = self.conn()?;
        let ts = conn.query_row(sql, [], row_to_timestamp).optional()?;
        Ok(ts)
    }
}

impl HistoryStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn append(&self, reading: &Reading) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO readings (ax, ay, az, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![reading.ax, reading.ay, reading.az, reading.time_text()],
        )?;
        Ok(())
    }

    fn range(&self, range: &TimeRange) -> StorageResult<Vec<Reading>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT ax, ay, az, created_at FROM readings
             WHERE created_at >= ?1 AND created_at <= ?2
             ORDER BY id",
        )?;

        let readings = stmt
            .query_map(
                params![format_timestamp(&range.start), format_timestamp(&range.end)],
                row_to_reading,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    fn all(&self) -> StorageResult<Vec<Reading>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare_cached("SELECT ax, ay, az, created_at FROM readings ORDER BY id")?;

        let readings = stmt
            .query_map([], row_to_reading)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    fn count(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn first_timestamp(&self) -> StorageResult<Option<NaiveDateTime>> {
        self.bound("SELECT created_at FROM readings ORDER BY id ASC LIMIT 1")
    }

    fn last_timestamp(&self) -> StorageResult<Option<NaiveDateTime>> {
        self.bound("SELECT created_at FROM readings ORDER BY id DESC LIMIT 1")
    }

    fn clear(&self) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM readings", [])?;
        tx.commit()?;

        tracing::info!(removed, "Cleared SQLite history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tempfile::tempdir;

    fn reading(secs: i64, v: f64) -> Reading {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Reading::new(v, -v, v / 2.0, base + Duration::milliseconds(secs * 1000 + 250))
    }

    #[test]
    fn test_in_memory_append_and_read() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.append(&reading(0, 1.5)).unwrap();
        store.append(&reading(1, -0.75)).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all, vec![reading(0, 1.5), reading(1, -0.75)]);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("imu.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            for i in 0..20 {
                store.append(&reading(i, i as f64)).unwrap();
            }
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 20);
        assert_eq!(store.last_timestamp().unwrap(), Some(reading(19, 0.0).timestamp));
    }

    #[test]
    fn test_clear_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("imu.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append(&reading(0, 1.0)).unwrap();
            store.clear().unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_schema_version_recorded() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.conn().unwrap();
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
