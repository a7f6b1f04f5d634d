//! Core data types for the imulog history store
//!
//! - `Reading`: one decoded three-axis measurement plus its arrival time
//! - `TimeRange`: an inclusive interval used by range queries
//! - `HistoryStats`: count and bounds of the stored history

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical textual form of a reading timestamp.
///
/// Fixed width (always six fractional digits), so lexical order of the text
/// equals chronological order. The SQLite backend relies on this for its
/// range scans.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Render a timestamp in the canonical textual form
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp as written by either history backend
///
/// Accepts `T` or space as the date/time separator; `%.f` also matches an
/// absent fractional part.
pub fn parse_stored_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
}

/// A single accelerometer reading
///
/// The timestamp is assigned by the server when the frame arrives, never by
/// the device. Serialized as `{"ax", "ay", "az", "time"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    #[serde(rename = "time", with = "timestamp_text")]
    pub timestamp: NaiveDateTime,
}

impl Reading {
    pub fn new(ax: f64, ay: f64, az: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            ax,
            ay,
            az,
            timestamp,
        }
    }

    /// Timestamp in the canonical textual form
    pub fn time_text(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

/// Serde adapter for timestamps in the canonical textual form
pub mod timestamp_text {
    use super::{format_timestamp, parse_stored_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_stored_timestamp(&text).map_err(serde::de::Error::custom)
    }
}

/// Inclusive time interval `[start, end]`
///
/// Unlike a half-open range, a reading stamped exactly at `end` matches.
/// An inverted range (start after end) is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Check if a timestamp falls within this range (both ends inclusive)
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        *timestamp >= self.start && *timestamp <= self.end
    }

    /// True when start is after end
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Size and bounds of the stored history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryStats {
    pub total_records: u64,
    pub first_record: Option<NaiveDateTime>,
    pub last_record: Option<NaiveDateTime>,
}

impl std::fmt::Display for HistoryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |ts: &Option<NaiveDateTime>| {
            ts.as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string())
        };
        write!(
            f,
            "Records: {}, First: {}, Last: {}",
            self.total_records,
            bound(&self.first_record),
            bound(&self.last_record)
        )
    }
}
