//! Schema inference: JSON records to `CREATE TABLE` / `INSERT` statements.
//!
//! ## Example
//!
//! ```rust
//! use sheetload::schema::{infer_statements, ColumnPolicy};
//!
//! let json = serde_json::json!([
//!     {"id": "1", "name": "Alice"},
//!     {"id": "2", "name": "Bob"},
//! ]);
//! let set = infer_statements(&json, ColumnPolicy::FirstRecord).unwrap();
//! assert_eq!(set.create_statement(), "CREATE TABLE IF NOT EXISTS id (id TEXT, name TEXT);");
//! assert_eq!(
//!     set.insert_statements()[1],
//!     "INSERT INTO id (id, name) VALUES ('2', 'Bob');"
//! );
//! ```

pub mod batch;
pub mod infer;
pub mod sql;

pub use batch::{infer_file, process_json_directory, save_sql, sql_file_name, InferReport};
pub use infer::{generate_table_name, infer_statements, ColumnPolicy, DEFAULT_TABLE_NAME};
pub use sql::{is_reserved_word, quote_identifier, quote_literal, Column, ColumnType, InsertStatement, StatementSet, TableSchema};
