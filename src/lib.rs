//! `sheetload` is a small batch pipeline that moves spreadsheet data into a relational database
//! without knowing the shape of the spreadsheets ahead of time.
//!
//! Every stage is a single linear pass over a directory:
//!
//! 1. [`ingestion`]: read `.csv` / `.xls` / `.xlsx` files into cleaned [`types::Table`]s
//!    (one per sheet). Excel support is behind the Cargo feature `excel` (on by default).
//! 2. [`export`]: write each table as a JSON array of flat string records, one file per sheet.
//! 3. [`schema`]: infer a TEXT-only `CREATE TABLE IF NOT EXISTS` plus one `INSERT` per record
//!    from each JSON file, and write them as `.sql` files.
//! 4. [`loader`]: execute every statement of every `.sql` file over one connection, best-effort,
//!    and commit once. Optionally dump the database with the native dump tool.
//!
//! [`pipeline::run_pipeline`] sequences all of it; the `sheetload` binary wraps it in a CLI.
//!
//! ## Cleaning rules
//!
//! Every table returned by [`ingestion::read_tables`] is rectangular with unique, non-empty
//! headers. Fully empty rows are dropped, fully empty unnamed columns are dropped, string cells
//! are trimmed, and missing cells are filled with a configurable placeholder.
//!
//! ## Quick example: one spreadsheet to SQL text
//!
//! ```no_run
//! use sheetload::export::table_to_records;
//! use sheetload::ingestion::{read_tables, ReaderOptions};
//! use sheetload::schema::{infer_statements, ColumnPolicy};
//!
//! # fn main() -> Result<(), sheetload::PipelineError> {
//! let options = ReaderOptions::default();
//! let workbook = read_tables("data/people.csv", &options)?;
//! for sheet in &workbook.sheets {
//!     let records = table_to_records(&sheet.table, &options.placeholder);
//!     let json = serde_json::to_value(&records)?;
//!     let set = infer_statements(&json, ColumnPolicy::FirstRecord)?;
//!     println!("{}", set.to_sql_text());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Loading
//!
//! Statements run through the [`loader::SqlExecutor`] trait. [`loader::SqlxExecutor`] connects
//! with `sqlx` (MySQL by default; any URL the `Any` driver accepts, such as `sqlite://`, also
//! works) and binds INSERT values as parameters. A failing statement is recorded in the
//! [`loader::LoadReport`] and the load continues.
//!
//! ## Modules
//!
//! - [`ingestion`]: format detection, CSV / Excel readers, cleaning
//! - [`export`]: JSON record files
//! - [`schema`]: table naming, schema and statement inference, SQL rendering
//! - [`loader`]: statement splitting, execution, database dump
//! - [`pipeline`]: the end-to-end driver and client pre-flight check
//! - [`observability`]: observer trait for per-file outcomes and alerts
//! - [`types`]: cell values, tables, workbooks
//! - [`error`]: the error type shared by every stage

pub mod error;
pub mod export;
pub mod ingestion;
pub mod loader;
pub mod observability;
pub mod pipeline;
pub mod schema;
pub mod types;

pub use error::{PipelineError, PipelineResult};
