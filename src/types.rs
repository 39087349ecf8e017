//! Core data model types.
//!
//! The reader produces a [`Workbook`] of named [`Table`]s whose cells are [`Value`]s. The JSON
//! exporter flattens each table into [`Record`]s, where every value is a string.

use chrono::{NaiveDateTime, Timelike};

/// Name given to the single implicit sheet of a CSV file.
pub const IMPLICIT_SHEET_NAME: &str = "Sheet1";

/// A single cell value.
///
/// Each variant has exactly one text rendering (see [`Value::render`]); the JSON exporter and the
/// SQL generator both go through it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value. Replaced by the placeholder during cleaning.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// Date and time without a timezone (Excel date cells).
    DateTime(NaiveDateTime),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Returns `true` for `Null` and for strings that are blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Utf8(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the value as record text. `Null` renders as `placeholder`.
    pub fn render(&self, placeholder: &str) -> String {
        match self {
            Value::Null => placeholder.to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Float64(f) => render_float(*f),
            Value::Bool(b) => b.to_string(),
            Value::DateTime(dt) => render_datetime(dt),
            Value::Utf8(s) => s.clone(),
        }
    }
}

fn render_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn render_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}

/// In-memory table read from one sheet.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as [`Table::columns`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Ordered column names. Unique once the table has been cleaned.
    pub columns: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the table.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// `true` when every row has exactly one value per column.
    pub fn is_rectangular(&self) -> bool {
        let width = self.columns.len();
        self.rows.iter().all(|r| r.len() == width)
    }
}

/// A named sheet within a [`Workbook`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet name as stored in the source file.
    pub name: String,
    /// Cleaned sheet contents.
    pub table: Table,
}

/// All sheets read from one source file, in workbook order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create a workbook from sheets.
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Total number of rows across all sheets.
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.table.row_count()).sum()
    }
}

/// JSON form of a row: column name to string value, in column order.
pub type Record = serde_json::Map<String, serde_json::Value>;
