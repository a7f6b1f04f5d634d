//! CSV export
//!
//! Renders readings with the same `time,ax,ay,az` layout as the history log,
//! so an export can be loaded back by the recovery loader.

use crate::storage::{CsvRow, Reading, StorageError, StorageResult, CSV_HEADER};
use chrono::NaiveDateTime;

/// A rendered CSV document and the filename suggested to the client
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub rows: usize,
}

/// Serialize readings to CSV bytes (header row always present)
pub fn to_csv(readings: &[Reading]) -> StorageResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::with_capacity(64 + readings.len() * 48));

    writer.write_record(CSV_HEADER)?;
    for reading in readings {
        writer.serialize(CsvRow::from(reading))?;
    }

    writer
        .into_inner()
        .map_err(|e| StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

/// `imu_data_<start>_<end>.csv`, minute resolution
pub fn range_filename(start: &NaiveDateTime, end: &NaiveDateTime) -> String {
    format!(
        "imu_data_{}_{}.csv",
        start.format("%Y%m%d_%H%M"),
        end.format("%Y%m%d_%H%M")
    )
}

/// `imu_data_complete_<generated>.csv`, second resolution
pub fn complete_filename(generated_at: &NaiveDateTime) -> String {
    format!("imu_data_complete_{}.csv", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Build an export document for a range
pub fn export_range(
    readings: &[Reading],
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> StorageResult<ExportFile> {
    Ok(ExportFile {
        bytes: to_csv(readings)?,
        filename: range_filename(start, end),
        rows: readings.len(),
    })
}

/// Build an export document for the whole history
pub fn export_all(readings: &[Reading], generated_at: &NaiveDateTime) -> StorageResult<ExportFile> {
    Ok(ExportFile {
        bytes: to_csv(readings)?,
        filename: complete_filename(generated_at),
        rows: readings.len(),
    })
}
