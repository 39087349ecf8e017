//! Serialization of cleaned tables to intermediate JSON files.

pub mod json;

pub use json::{export_workbook, json_file_name, read_records, table_to_records, write_records};
