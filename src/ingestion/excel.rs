#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::PipelineResult;
use crate::types::{Table, Value};

/// Read every sheet of an Excel document (`.xlsx`, `.xls`) into raw (uncleaned) tables.
///
/// Behavior:
/// - Sheets are returned in workbook order, keyed by sheet name
/// - The first non-empty row of each sheet is the header row; rows above it are skipped
/// - A sheet without any non-empty row yields an empty table
/// - Cells keep their native type (number, bool, date/time, text)
pub fn read_excel_from_path(path: impl AsRef<Path>) -> PipelineResult<Vec<(String, Table)>> {
    let mut workbook = open_workbook_auto(path)?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let table = read_sheet_range(&range);
        out.push((name, table));
    }

    Ok(out)
}

fn read_sheet_range(range: &calamine::Range<Data>) -> Table {
    let mut rows = range.rows();

    let header = loop {
        match rows.next() {
            Some(row) if row.iter().any(|c| !matches!(c, Data::Empty)) => break row,
            Some(_) => continue,
            None => return Table::default(),
        }
    };

    let columns: Vec<String> = header.iter().map(cell_to_header_string).collect();
    let body = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Table::new(columns, body)
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => Value::Float64(*f).render(""),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| Value::DateTime(d).render(""))
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => "".to_string(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(d) => Value::DateTime(d),
            None => Value::Float64(dt.as_f64()),
        },
        Data::DateTimeIso(s) => Value::Utf8(s.clone()),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(e) => Value::Utf8(e.to_string()),
    }
}

/// Convert an Excel serial date (1900 date system) to a timestamp.
///
/// Serial 0 is 1899-12-30, which absorbs Excel's phantom 1900-02-29 for every date after
/// March 1900.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
