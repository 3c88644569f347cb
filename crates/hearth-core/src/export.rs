//! File sinks for the finished record sequence.
//!
//! Two interchange formats: delimited text with a fixed header row, and a
//! structured-text array with nulls kept explicit. Column/key order is the
//! [`Listing`](crate::models::Listing) declaration order.

use std::io::Write;
use std::path::Path;

use chrono::Utc;

use crate::error::AppError;
use crate::models::Listing;

/// Write records as CSV with a header row; null fields become empty cells.
pub fn write_csv<W: Write>(records: &[Listing], writer: W) -> Result<(), AppError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write records as a pretty-printed JSON array, nulls explicit.
pub fn write_json<W: Write>(records: &[Listing], writer: W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

pub fn write_csv_file(records: &[Listing], path: &Path) -> Result<(), AppError> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file)
}

pub fn write_json_file(records: &[Listing], path: &Path) -> Result<(), AppError> {
    let file = std::fs::File::create(path)?;
    write_json(records, file)
}

/// Read a previously exported JSON array back in (for the DB load step).
pub fn read_json_file(path: &Path) -> Result<Vec<Listing>, AppError> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Timestamped default output name, e.g. `listings_20250816_223523.csv`.
pub fn default_output_name(extension: &str) -> String {
    format!("listings_{}.{extension}", Utc::now().format("%Y%m%d_%H%M%S"))
}
