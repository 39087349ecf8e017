//! CSV reading implementation.

use std::path::Path;

use crate::error::PipelineResult;
use crate::types::{Table, Value};

/// Read a CSV file into a raw (uncleaned) [`Table`].
///
/// Rules:
///
/// - The first record is the header row.
/// - Rows may be ragged; short rows are padded later by cleaning, long rows widen the table.
/// - Every cell is kept as text; empty cells become [`Value::Null`].
pub fn read_csv_from_path(path: impl AsRef<Path>) -> PipelineResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader.
pub fn read_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> PipelineResult<Table> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(raw_cell).collect());
    }

    Ok(Table::new(headers, rows))
}

fn raw_cell(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Null
    } else {
        Value::Utf8(raw.to_owned())
    }
}
