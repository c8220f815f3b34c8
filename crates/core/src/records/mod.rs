//! Input vehicle records.
//!
//! The monitoring station exports a semicolon-delimited CSV of passings.
//! Only the columns the pipeline needs are lifted out; everything else in
//! the export (license plates, weights, flag columns) is ignored.

use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reading the input record file.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to read record file: {0}")]
    Io(#[from] std::io::Error),

    /// The export is missing a column the pipeline cannot work without.
    #[error("Record file is missing the {0} column")]
    MissingColumn(&'static str),
}

/// One row of the station export.
///
/// A record with no usable id is kept (the orchestrator skips it silently),
/// so a single malformed row never aborts a run.
#[derive(Debug, Clone, Default)]
pub struct VehicleRecord {
    /// Vehicle id used to build the detail request; `None` when the column
    /// was empty or not a number.
    pub vehicle_id: Option<i64>,
    /// Passing timestamp as exported, opaque here.
    pub timestamp: Option<String>,
    /// Lane identifier.
    pub lane: Option<String>,
}

const DELIMITER: char = ';';
const ID_COLUMN: &str = "vehicleId";
const TIMESTAMP_COLUMN: &str = "timestamp";
const LANE_COLUMN: &str = "lane";

/// Reads records from a station export file.
pub fn read_records(path: &Path) -> Result<Vec<VehicleRecord>, RecordError> {
    let contents = std::fs::read_to_string(path)?;
    let records = parse_records(&contents)?;
    debug!(count = records.len(), "Read vehicle records from {}", path.display());
    Ok(records)
}

/// Parses records from the export contents.
pub fn parse_records(contents: &str) -> Result<Vec<VehicleRecord>, RecordError> {
    let mut lines = contents.lines();
    let header = lines.next().unwrap_or("");
    let columns: Vec<&str> = header.split(DELIMITER).map(str::trim).collect();

    let id_idx = find_column(&columns, ID_COLUMN)
        .ok_or(RecordError::MissingColumn(ID_COLUMN))?;
    let timestamp_idx = find_column(&columns, TIMESTAMP_COLUMN);
    let lane_idx = find_column(&columns, LANE_COLUMN);
    if timestamp_idx.is_none() {
        warn!("{} column not in the export", TIMESTAMP_COLUMN);
    }

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();

        let vehicle_id = fields.get(id_idx).and_then(|f| f.parse::<i64>().ok());
        if vehicle_id.is_none() {
            warn!("{} not usable in row: {}", ID_COLUMN, line);
        }

        records.push(VehicleRecord {
            vehicle_id,
            timestamp: lift(&fields, timestamp_idx),
            lane: lift(&fields, lane_idx),
        });
    }
    Ok(records)
}

fn find_column(columns: &[&str], name: &str) -> Option<usize> {
    columns.iter().position(|c| *c == name)
}

fn lift(fields: &[&str], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| fields.get(i))
        .filter(|f| !f.is_empty())
        .map(|f| f.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_columns_it_needs() {
        let csv = "vehicleId;frontLpNumber;timestamp;lane;ucid\n\
                   17;AB123;2023-04-01T10:00:00+02:00;L1;3\n\
                   18;;2023-04-01T10:00:05+02:00;;5\n";
        let records = parse_records(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vehicle_id, Some(17));
        assert_eq!(records[0].lane.as_deref(), Some("L1"));
        assert_eq!(records[1].vehicle_id, Some(18));
        assert!(records[1].lane.is_none());
    }

    #[test]
    fn unusable_ids_become_none() {
        let csv = "vehicleId;timestamp\n;x\nnot-a-number;y\n42;z\n";
        let records = parse_records(csv).unwrap();
        assert_eq!(records[0].vehicle_id, None);
        assert_eq!(records[1].vehicle_id, None);
        assert_eq!(records[2].vehicle_id, Some(42));
    }

    #[test]
    fn missing_id_column_is_an_error() {
        let csv = "timestamp;lane\nx;y\n";
        let err = parse_records(csv).unwrap_err();
        assert!(matches!(err, RecordError::MissingColumn("vehicleId")));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let csv = "vehicleId\n1\n\n2\n";
        assert_eq!(parse_records(csv).unwrap().len(), 2);
    }
}
