//! Schema inference from JSON records.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PipelineError, PipelineResult};

use super::sql::{Column, InsertStatement, StatementSet, TableSchema};

/// Table name used when the input has no usable first key.
pub const DEFAULT_TABLE_NAME: &str = "default_table";

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid non-word regex"));

/// How the column list is derived when records disagree on their keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnPolicy {
    /// Columns come from the first record only. Keys that appear only in later records are
    /// dropped; keys missing from a later record insert `NULL`.
    #[default]
    FirstRecord,
    /// Columns are the union of keys across all records, in first-seen order.
    UnionOfKeys,
}

/// Derive a table name from the first key of the first record (or of the object itself).
///
/// Every run of non-word characters becomes `_` and the result is lower-cased. Empty input,
/// non-object input, or a key that normalizes to nothing yields [`DEFAULT_TABLE_NAME`].
pub fn generate_table_name(json: &serde_json::Value) -> String {
    let first_key = match json {
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|v| v.as_object())
            .and_then(|m| m.keys().next()),
        serde_json::Value::Object(map) => map.keys().next(),
        _ => None,
    };

    match first_key {
        Some(key) => {
            let name = NON_WORD.replace_all(key, "_").to_lowercase();
            if name.is_empty() {
                DEFAULT_TABLE_NAME.to_string()
            } else {
                name
            }
        }
        None => DEFAULT_TABLE_NAME.to_string(),
    }
}

/// Infer a TEXT-only schema plus one INSERT per record.
///
/// Accepts a JSON array of objects or a single object. Fails with
/// [`PipelineError::SchemaInference`] when there is nothing to build a table from.
pub fn infer_statements(json: &serde_json::Value, policy: ColumnPolicy) -> PipelineResult<StatementSet> {
    let records: Vec<&serde_json::Map<String, serde_json::Value>> = match json {
        serde_json::Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx0, v)| {
                v.as_object().ok_or_else(|| PipelineError::SchemaInference {
                    message: format!("element {} is not a json object", idx0 + 1),
                })
            })
            .collect::<PipelineResult<_>>()?,
        serde_json::Value::Object(map) => vec![map],
        _ => {
            return Err(PipelineError::SchemaInference {
                message: "json must be an object or an array of objects".to_string(),
            });
        }
    };

    let columns = column_names(&records, policy);
    if columns.is_empty() {
        return Err(PipelineError::SchemaInference {
            message: "no columns: input has no records or the first record is empty".to_string(),
        });
    }

    let table = generate_table_name(json);
    let inserts = records
        .iter()
        .map(|record| InsertStatement {
            table: table.clone(),
            columns: columns.clone(),
            values: columns
                .iter()
                .map(|c| record.get(c).and_then(sql_value))
                .collect(),
        })
        .collect();

    Ok(StatementSet {
        schema: TableSchema {
            name: table,
            columns: columns.into_iter().map(Column::text).collect(),
        },
        inserts,
    })
}

fn column_names(
    records: &[&serde_json::Map<String, serde_json::Value>],
    policy: ColumnPolicy,
) -> Vec<String> {
    match policy {
        ColumnPolicy::FirstRecord => records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default(),
        ColumnPolicy::UnionOfKeys => {
            let mut out: Vec<String> = Vec::new();
            for record in records {
                for key in record.keys() {
                    if !out.contains(key) {
                        out.push(key.clone());
                    }
                }
            }
            out
        }
    }
}

/// Text form of a JSON value for a TEXT column; `null` maps to SQL `NULL`.
fn sql_value(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
