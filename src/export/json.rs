//! JSON export of cleaned tables.
//!
//! Output format: one file per sheet, a JSON array of flat objects whose values are all strings.
//! Date/time cells are written as text (`YYYY-MM-DD HH:MM:SS`), never as a native date type.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Record, Table, Workbook};

/// File name for one exported sheet: `<base>_<sheet>.json`, spaces replaced with `_`.
pub fn json_file_name(base_name: &str, sheet_name: &str) -> String {
    format!("{base_name}_{sheet_name}.json").replace(' ', "_")
}

/// Convert a table into records, one per row, preserving row and column order.
pub fn table_to_records(table: &Table, placeholder: &str) -> Vec<Record> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .columns
                .iter()
                .zip(row.iter())
                .map(|(col, v)| (col.clone(), serde_json::Value::String(v.render(placeholder))))
                .collect()
        })
        .collect()
}

/// Write every sheet of `workbook` to `output_dir`, returning the written paths in sheet order.
///
/// Creates `output_dir` if it does not exist. Existing files are overwritten.
pub fn export_workbook(
    workbook: &Workbook,
    base_name: &str,
    output_dir: impl AsRef<Path>,
    placeholder: &str,
) -> PipelineResult<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        let path = output_dir.join(json_file_name(base_name, &sheet.name));
        let records = table_to_records(&sheet.table, placeholder);
        write_records(&path, &records)?;
        log::info!("saved JSON file: {} ({} records)", path.display(), records.len());
        written.push(path);
    }

    Ok(written)
}

/// Write records as a compact JSON array.
pub fn write_records(path: impl AsRef<Path>, records: &[Record]) -> PipelineResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, records)?;
    out.flush()?;
    Ok(())
}

/// Read an exported file back as records.
///
/// Accepts a JSON array of objects or a single object.
pub fn read_records(path: impl AsRef<Path>) -> PipelineResult<Vec<Record>> {
    let rdr = BufReader::new(File::open(path)?);
    let value: serde_json::Value = serde_json::from_reader(rdr)?;
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx0, item)| match item {
                serde_json::Value::Object(map) => Ok(map),
                _ => Err(PipelineError::SchemaInference {
                    message: format!("element {} is not a json object", idx0 + 1),
                }),
            })
            .collect(),
        serde_json::Value::Object(map) => Ok(vec![map]),
        _ => Err(PipelineError::SchemaInference {
            message: "json must be an object or an array of objects".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{json_file_name, table_to_records};
    use crate::types::{Table, Value};

    #[test]
    fn file_names_replace_spaces() {
        assert_eq!(json_file_name("Q1 report", "Sheet 2"), "Q1_report_Sheet_2.json");
    }

    #[test]
    fn records_keep_column_order_and_coerce_to_strings() {
        let table = Table::new(
            vec!["zeta".to_string(), "alpha".to_string()],
            vec![vec![Value::Int64(1), Value::Null]],
        );
        let records = table_to_records(&table, "N/A");
        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(records[0]["zeta"], "1");
        assert_eq!(records[0]["alpha"], "N/A");
    }
}
