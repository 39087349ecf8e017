//! Tabular reading: spreadsheet files to cleaned tables.
//!
//! Most callers should use [`read_tables`] (from [`unified`]) which:
//!
//! - detects the format by file extension (or you can force one via [`ReaderOptions`])
//! - reads every sheet into an in-memory [`crate::types::Table`]
//! - applies the cleaning rules in [`clean`]
//!
//! Format-specific functions are also available under [`csv`] and (feature `excel`) `excel`.

pub mod clean;
pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod unified;

pub use clean::{clean_table, unique_headers};
pub use unified::{detect_format, read_tables, read_tables_observed, ReaderOptions, SourceFormat};
