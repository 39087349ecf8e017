//! Table cleaning applied to every sheet before export.
//!
//! After [`clean_table`] a table is rectangular, has unique non-empty headers, and contains no
//! [`Value::Null`] cells.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Table, Value};

/// Headers produced by spreadsheet tooling for unlabeled columns (e.g. `Unnamed: 3`).
static AUTO_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Unnamed(:\s*\d+)?$").expect("valid auto-header regex"));

/// Apply the cleaning rules to a raw table read from any source.
///
/// Rules, in order:
///
/// - rows whose cells are all empty are dropped
/// - columns with no non-empty cell are dropped, whatever their header
/// - headers are trimmed; blank or auto-generated headers become `Column_<index>`
/// - duplicate headers become `<name>_<index>` (bumped until unique)
/// - string cells are trimmed; other cells are left unchanged
/// - empty cells are replaced with `Value::Utf8(placeholder)`
pub fn clean_table(raw: Table, placeholder: &str) -> Table {
    let width = raw
        .rows
        .iter()
        .map(|r| r.len())
        .chain(std::iter::once(raw.columns.len()))
        .max()
        .unwrap_or(0);

    let rows: Vec<Vec<Value>> = raw
        .rows
        .into_iter()
        .filter(|row| row.iter().any(|v| !v.is_empty()))
        .map(|mut row| {
            row.resize(width, Value::Null);
            row
        })
        .collect();

    let keep: Vec<usize> = (0..width)
        .filter(|&idx| rows.iter().any(|r| !r[idx].is_empty()))
        .collect();

    let columns = unique_headers(
        keep.iter()
            .map(|&idx| raw.columns.get(idx).map(String::as_str).unwrap_or("")),
    );

    let rows = rows
        .into_iter()
        .map(|row| {
            keep.iter()
                .map(|&idx| clean_cell(&row[idx], placeholder))
                .collect()
        })
        .collect();

    Table::new(columns, rows)
}

fn clean_cell(value: &Value, placeholder: &str) -> Value {
    match value {
        Value::Null => Value::Utf8(placeholder.to_string()),
        Value::Utf8(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Utf8(placeholder.to_string())
            } else {
                Value::Utf8(trimmed.to_string())
            }
        }
        other => other.clone(),
    }
}

/// Apply the header naming rules to raw headers, in position order.
pub fn unique_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (idx, header) in raw.into_iter().enumerate() {
        let trimmed = header.trim();
        let base = if trimmed.is_empty() || AUTO_HEADER.is_match(trimmed) {
            format!("Column_{idx}")
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = idx;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}
