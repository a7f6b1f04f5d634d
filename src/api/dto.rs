//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use crate::storage::{format_timestamp, HistoryStats, Reading};
use serde::{Deserialize, Serialize};

// ============================================
// LATEST DTOs
// ============================================

/// Body of `GET /data`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LatestResponse {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    /// Canonical timestamp, empty before the first reading
    pub time: String,
}

impl From<Option<Reading>> for LatestResponse {
    fn from(reading: Option<Reading>) -> Self {
        match reading {
            Some(r) => Self {
                ax: r.ax,
                ay: r.ay,
                az: r.az,
                time: r.time_text(),
            },
            None => Self {
                ax: 0.0,
                ay: 0.0,
                az: 0.0,
                time: String::new(),
            },
        }
    }
}

// ============================================
// QUERY DTOs
// ============================================

/// Range parameters shared by filter and download
#[derive(Debug, Default, Deserialize)]
pub struct RangeParams {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

// ============================================
// STATS DTOs
// ============================================

/// Body of `GET /api/stats`
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_records: u64,
    pub first_record: Option<String>,
    pub last_record: Option<String>,
}

impl From<HistoryStats> for StatsResponse {
    fn from(stats: HistoryStats) -> Self {
        Self {
            total_records: stats.total_records,
            first_record: stats.first_record.as_ref().map(format_timestamp),
            last_record: stats.last_record.as_ref().map(format_timestamp),
        }
    }
}

// ============================================
// CLEAR DTOs
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Storage status
    pub storage: String,
    /// Active history backend
    pub backend: String,
    /// Device sessions currently connected
    pub device_sessions: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_absent_latest_sentinel() {
        let body = serde_json::to_value(LatestResponse::from(None)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"ax": 0.0, "ay": 0.0, "az": 0.0, "time": ""})
        );
    }

    #[test]
    fn test_stats_formatting() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let stats = HistoryStats {
            total_records: 1,
            first_record: Some(ts),
            last_record: Some(ts),
        };
        let body = StatsResponse::from(stats);
        assert_eq!(body.first_record.as_deref(), Some("2024-05-01T08:00:00.000000"));

        let empty = StatsResponse::from(HistoryStats::default());
        assert_eq!(empty.total_records, 0);
        assert!(empty.last_record.is_none());
    }
}
