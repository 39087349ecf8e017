use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by every pipeline stage.
///
/// This is a single error enum shared across reading, export, schema inference and loading.
/// The driver decides per variant whether a failure is skipped (per file / per statement) or
/// aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The input file extension is not one of `.csv`, `.xls`, `.xlsx`.
    #[error("unsupported format '{extension}' for path {path:?}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[cfg(feature = "excel")]
    /// Excel parse error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV parse error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON (or a JSON value that could not be serialized).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON input has no usable shape (no records, or records that are not objects).
    #[error("schema inference failed: {message}")]
    SchemaInference { message: String },

    /// A single SQL statement was rejected by the server.
    #[error("statement failed in {file}: {message}")]
    StatementExecution { file: String, message: String },

    /// Driver-level error for a single statement or transaction call.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The database could not be reached or the connection dropped.
    #[error("database connection failed: {message}")]
    Connection { message: String },

    /// The database command-line client is not installed or not on `PATH`.
    #[error("database client '{binary}' unavailable: {message}")]
    ClientUnavailable { binary: String, message: String },

    /// The native dump utility failed.
    #[error("database dump failed: {message}")]
    Dump { message: String },
}
