//! End-to-end driver: spreadsheets → JSON → SQL → database (→ optional dump).
//!
//! Each stage runs over a directory and keeps going past per-file failures. Outputs already
//! written to disk are kept when a later stage fails.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};
use crate::export::export_workbook;
use crate::ingestion::{read_tables_observed, ReaderOptions};
use crate::loader::{self, create_dump, DatabaseConfig, DumpOptions, LoadReport, SqlxExecutor};
use crate::observability::{self, PipelineObserver, Severity, Stage, StageContext, StageStats};
use crate::schema::{process_json_directory, ColumnPolicy, InferReport};

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding `.csv` / `.xls` / `.xlsx` inputs (not searched recursively).
    pub input_dir: PathBuf,
    pub json_dir: PathBuf,
    pub sql_dir: PathBuf,
    pub reader: ReaderOptions,
    pub column_policy: ColumnPolicy,
    pub database: DatabaseConfig,
    /// Overrides the URL derived from [`Self::database`] (e.g. `sqlite://...`).
    pub database_url: Option<String>,
    /// Dump the database after loading.
    pub dump: bool,
    pub dump_dir: PathBuf,
    pub dump_options: DumpOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./data"),
            json_dir: PathBuf::from("./json"),
            sql_dir: PathBuf::from("./sql"),
            reader: ReaderOptions::default(),
            column_policy: ColumnPolicy::default(),
            database: DatabaseConfig::default(),
            database_url: None,
            dump: false,
            dump_dir: PathBuf::from("./dumps"),
            dump_options: DumpOptions::default(),
        }
    }
}

/// Summary of a pipeline run.
#[derive(Debug, Default, Serialize)]
pub struct PipelineReport {
    /// Input files read and exported.
    pub files_read: Vec<PathBuf>,
    /// Input files skipped, with the reason.
    pub files_failed: Vec<(PathBuf, String)>,
    /// JSON files written by the export stage.
    pub json_written: Vec<PathBuf>,
    pub infer: InferReport,
    /// `None` when the database could not be reached.
    pub load: Option<LoadReport>,
    pub load_error: Option<String>,
    pub dump: Option<PathBuf>,
    pub dump_error: Option<String>,
}

impl PipelineReport {
    /// True when every stage that ran finished without a recorded failure.
    pub fn is_clean(&self) -> bool {
        self.files_failed.is_empty()
            && self.infer.failed.is_empty()
            && self.load_error.is_none()
            && self.dump_error.is_none()
            && self.load.as_ref().is_none_or(|l| l.failure_count() == 0 && l.unreadable().count() == 0)
    }
}

/// Check that the database command-line client runs, returning its `--version` output.
pub fn check_client_installed(binary: &str) -> PipelineResult<String> {
    let output = Command::new(binary).arg("--version").output().map_err(|e| {
        let message = if e.kind() == std::io::ErrorKind::NotFound {
            "executable not found; make sure it is installed and on PATH".to_string()
        } else {
            e.to_string()
        };
        PipelineError::ClientUnavailable {
            binary: binary.to_string(),
            message,
        }
    })?;

    if !output.status.success() {
        return Err(PipelineError::ClientUnavailable {
            binary: binary.to_string(),
            message: format!(
                "`{binary} --version` exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    log::info!("database client is installed: {version}");
    Ok(version)
}

/// Regular files directly inside `dir`, sorted by file name.
pub fn list_input_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => PipelineError::Io(io),
            None => PipelineError::Io(std::io::Error::other("directory walk failed")),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Read every input file and export its sheets as JSON into `config.json_dir`.
pub fn export_inputs(
    config: &PipelineConfig,
    observer: Option<&dyn PipelineObserver>,
    report: &mut PipelineReport,
) -> PipelineResult<()> {
    for path in list_input_files(&config.input_dir)? {
        log::info!("reading {}", path.display());
        let base = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("input")
            .to_string();

        let workbook = match read_tables_observed(&path, &config.reader, observer, Severity::Critical) {
            Ok(wb) => wb,
            Err(e) => {
                log::error!("skipping {}: {e}", path.display());
                report.files_failed.push((path, e.to_string()));
                continue;
            }
        };

        let exported = export_workbook(&workbook, &base, &config.json_dir, &config.reader.placeholder);
        observability::report(
            observer,
            &StageContext::new(Stage::Export, &path),
            &exported,
            |files| StageStats {
                items: files.len(),
                rows: workbook.total_rows(),
            },
            Severity::Critical,
        );
        match exported {
            Ok(files) => {
                for f in &files {
                    log::info!("data saved to {}", f.display());
                }
                report.json_written.extend(files);
                report.files_read.push(path);
            }
            Err(e) => {
                log::error!("could not export {}: {e}", path.display());
                report.files_failed.push((path, e.to_string()));
            }
        }
    }
    Ok(())
}

/// Run the whole pipeline once.
///
/// Per-file and per-statement failures are recorded in the returned report. A database that
/// cannot be reached is logged and recorded as `load_error`; the JSON and SQL outputs stay on
/// disk. The error return is reserved for failures that stop the run before any file is processed
/// (e.g. an unreadable input directory).
pub fn run_pipeline(
    config: &PipelineConfig,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<PipelineReport> {
    fs::create_dir_all(&config.json_dir)?;
    fs::create_dir_all(&config.sql_dir)?;

    let mut report = PipelineReport::default();
    export_inputs(config, observer, &mut report)?;
    log::info!(
        "export finished: {} files read, {} skipped",
        report.files_read.len(),
        report.files_failed.len()
    );

    report.infer = process_json_directory(&config.json_dir, &config.sql_dir, config.column_policy, observer)?;

    let connected = match &config.database_url {
        Some(url) => SqlxExecutor::connect_url(url),
        None => SqlxExecutor::connect(&config.database),
    };
    match connected.and_then(|mut exec| loader::load_sql_directory(&config.sql_dir, &mut exec, observer)) {
        Ok(load) => report.load = Some(load),
        Err(e) => {
            log::error!("loading SQL into the database failed: {e}");
            report.load_error = Some(e.to_string());
            observability::report::<()>(
                observer,
                &StageContext::new(Stage::Load, &config.sql_dir),
                &Err(e),
                |_| StageStats::default(),
                Severity::Critical,
            );
        }
    }

    if config.dump {
        match create_dump(&config.database, &config.dump_dir, &config.dump_options) {
            Ok(path) => report.dump = Some(path),
            Err(e) => {
                log::error!("{e}");
                report.dump_error = Some(e.to_string());
                observability::report::<()>(
                    observer,
                    &StageContext::new(Stage::Dump, &config.dump_dir),
                    &Err(e),
                    |_| StageStats::default(),
                    Severity::Critical,
                );
            }
        }
    }

    Ok(report)
}
