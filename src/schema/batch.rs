//! Directory-level schema inference: every `*.json` file becomes one `*_output.sql` file.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::observability::{self, PipelineObserver, Severity, Stage, StageContext, StageStats};

use super::infer::{infer_statements, ColumnPolicy};
use super::sql::StatementSet;

/// Outcome of one directory pass.
#[derive(Debug, Default, Serialize)]
pub struct InferReport {
    /// SQL files written, in input order.
    pub written: Vec<PathBuf>,
    /// JSON files skipped, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Output file name for a JSON input: `<stem>_output.sql`.
pub fn sql_file_name(json_path: &Path) -> String {
    let stem = json_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    format!("{stem}_output.sql")
}

/// Infer statements for a single JSON file.
pub fn infer_file(path: impl AsRef<Path>, policy: ColumnPolicy) -> PipelineResult<StatementSet> {
    let rdr = BufReader::new(File::open(path)?);
    let json: serde_json::Value = serde_json::from_reader(rdr)?;
    infer_statements(&json, policy)
}

/// Write a statement set to `path` (CREATE, blank line, INSERTs).
pub fn save_sql(set: &StatementSet, path: impl AsRef<Path>) -> PipelineResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, set.to_sql_text())?;
    Ok(())
}

/// List `*.<ext>` files directly inside `dir`, sorted by name.
pub(crate) fn list_files_with_extension(dir: &Path, ext: &str) -> PipelineResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}{}*.{ext}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        std::path::MAIN_SEPARATOR
    );
    let entries = glob::glob(&pattern).map_err(|e| {
        PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("bad file pattern {pattern}: {e}"),
        ))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(p) if p.is_file() => Some(p),
            Ok(_) => None,
            Err(e) => {
                log::warn!("skipping unreadable path: {e}");
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Convert every JSON file in `json_dir` into a SQL file in `sql_dir`.
///
/// Per-file failures (malformed JSON, unusable shape, write errors) are logged, recorded in the
/// report, and do not stop the batch. An empty directory logs a notice and returns an empty
/// report.
pub fn process_json_directory(
    json_dir: impl AsRef<Path>,
    sql_dir: impl AsRef<Path>,
    policy: ColumnPolicy,
    observer: Option<&dyn PipelineObserver>,
) -> PipelineResult<InferReport> {
    let json_dir = json_dir.as_ref();
    let sql_dir = sql_dir.as_ref();

    let files = list_files_with_extension(json_dir, "json")?;
    let mut report = InferReport::default();
    if files.is_empty() {
        log::warn!("no JSON files found in directory: {}", json_dir.display());
        return Ok(report);
    }

    fs::create_dir_all(sql_dir)?;
    for path in files {
        log::info!("processing file: {}", path.display());
        let out_path = sql_dir.join(sql_file_name(&path));

        let result = infer_file(&path, policy).and_then(|set| {
            save_sql(&set, &out_path)?;
            Ok(set)
        });
        observability::report(
            observer,
            &StageContext::new(Stage::Infer, &path),
            &result,
            |set| StageStats {
                items: 1 + set.inserts.len(),
                rows: set.inserts.len(),
            },
            Severity::Critical,
        );

        match result {
            Ok(_) => {
                log::info!("SQL schema saved to {}", out_path.display());
                report.written.push(out_path);
            }
            Err(e) => {
                log::error!("error processing {}: {e}", path.display());
                report.failed.push((path, e.to_string()));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::sql_file_name;

    #[test]
    fn output_name_uses_json_stem() {
        assert_eq!(sql_file_name(Path::new("json/people_Sheet1.json")), "people_Sheet1_output.sql");
    }
}
