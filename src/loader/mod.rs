//! Loading generated SQL files into a database.
//!
//! Execution is best-effort: a failing statement is recorded and skipped, the next statement
//! and the next file still run, and everything is committed once at the end. Re-running against
//! the same database appends rows again (tables are created with `IF NOT EXISTS`).

pub mod config;
pub mod dump;
pub mod executor;
pub mod split;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::observability::{self, PipelineObserver, Severity, Stage, StageContext, StageStats};
use crate::schema::batch::list_files_with_extension;

pub use config::DatabaseConfig;
pub use dump::{create_dump, dump_command, dump_file_name, DumpOptions};
pub use executor::{SqlExecutor, SqlxExecutor};
pub use split::{split_statements, SqlStatement};

/// One rejected statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
    pub file: PathBuf,
    /// 1-based position of the statement within its file.
    pub index: usize,
    pub message: String,
}

/// Outcome for one SQL file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileLoadReport {
    pub path: PathBuf,
    /// Statements that executed successfully.
    pub executed: usize,
    /// Successful statements that were parameterized INSERTs.
    pub inserted: usize,
    pub failures: Vec<StatementFailure>,
    /// Set when the file could not be read; no statement from it ran.
    pub read_error: Option<String>,
}

/// Outcome of one load pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub files: Vec<FileLoadReport>,
}

impl LoadReport {
    pub fn executed(&self) -> usize {
        self.files.iter().map(|f| f.executed).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementFailure> {
        self.files.iter().flat_map(|f| f.failures.iter())
    }

    pub fn failure_count(&self) -> usize {
        self.files.iter().map(|f| f.failures.len()).sum()
    }

    pub fn unreadable(&self) -> impl Iterator<Item = &FileLoadReport> {
        self.files.iter().filter(|f| f.read_error.is_some())
    }
}

/// Execute every statement of one SQL text, in order, continuing past failures.
pub fn load_sql_text(
    path: &Path,
    text: &str,
    executor: &mut dyn SqlExecutor,
    observer: Option<&dyn PipelineObserver>,
) -> FileLoadReport {
    let mut report = FileLoadReport {
        path: path.to_path_buf(),
        ..Default::default()
    };
    let file = path.display().to_string();

    for (idx0, fragment) in split_statements(text).into_iter().enumerate() {
        let statement = SqlStatement::parse(&fragment);
        match executor.execute(&statement) {
            Ok(_) => {
                report.executed += 1;
                if matches!(statement, SqlStatement::Insert(_)) {
                    report.inserted += 1;
                }
            }
            Err(e) => {
                let message = e.to_string();
                log::error!("error executing statement {} in {file}: {message}", idx0 + 1);
                log::debug!("failed statement: {fragment}");
                let failed: PipelineResult<()> = Err(PipelineError::StatementExecution {
                    file: file.clone(),
                    message: message.clone(),
                });
                observability::report(
                    observer,
                    &StageContext::new(Stage::Load, path),
                    &failed,
                    |_| StageStats::default(),
                    Severity::Critical,
                );
                report.failures.push(StatementFailure {
                    file: path.to_path_buf(),
                    index: idx0 + 1,
                    message,
                });
            }
        }
    }

    report
}

/// Execute every `*.sql` file in `sql_dir` (sorted by name), then commit once.
///
/// Statement and unreadable-file failures are recorded in the report. The returned error is
/// reserved for listing the directory and for the final commit.
pub fn load_sql_directory(
    sql_dir: impl AsRef<Path>,
    executor: &mut dyn SqlExecutor,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<LoadReport> {
    let sql_dir = sql_dir.as_ref();
    let files = list_files_with_extension(sql_dir, "sql")?;
    if files.is_empty() {
        log::warn!("no SQL files found in directory: {}", sql_dir.display());
    }

    let mut report = LoadReport::default();
    for path in files {
        log::info!("loading SQL file: {}", path.display());
        let ctx = StageContext::new(Stage::Load, &path);

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                let err = PipelineError::from(e);
                log::error!("could not read {}: {err}", path.display());
                let message = err.to_string();
                observability::report::<()>(
                    observer,
                    &ctx,
                    &Err(err),
                    |_| StageStats::default(),
                    Severity::Critical,
                );
                report.files.push(FileLoadReport {
                    path,
                    read_error: Some(message),
                    ..Default::default()
                });
                continue;
            }
        };

        let file_report = load_sql_text(&path, &text, executor, observer);
        if let Some(o) = observer {
            o.on_success(
                &ctx,
                StageStats {
                    items: file_report.executed,
                    rows: file_report.inserted,
                },
            );
        }
        log::info!(
            "{}: {} statements executed, {} failed",
            path.display(),
            file_report.executed,
            file_report.failures.len()
        );
        report.files.push(file_report);
    }

    executor.commit()?;
    log::info!(
        "load committed: {} statements executed, {} failed",
        report.executed(),
        report.failure_count()
    );
    Ok(report)
}

/// Connect with `config`, load `sql_dir`, and commit.
///
/// A connection failure is returned as [`PipelineError::Connection`] before any file is read.
pub fn upload_sql_directory(
    sql_dir: impl AsRef<Path>,
    config: &DatabaseConfig,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<LoadReport> {
    let mut executor = SqlxExecutor::connect(config)?;
    load_sql_directory(sql_dir, &mut executor, observer)
}
