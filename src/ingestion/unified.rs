//! Unified reading entrypoint.
//!
//! Most callers should use [`read_tables`], which reads a spreadsheet file into a cleaned
//! [`crate::types::Workbook`].
//!
//! - If [`ReaderOptions::format`] is `None`, the format is inferred from the file extension.
//! - [`read_tables_observed`] additionally reports success/failure/alerts to a
//!   [`crate::observability::PipelineObserver`].

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::observability::{self, PipelineObserver, Severity, Stage, StageContext, StageStats};
use crate::types::{Sheet, Table, Workbook, IMPLICIT_SHEET_NAME};

use super::clean::clean_table;
use super::csv;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values (one implicit sheet).
    Csv,
    /// Excel workbook, `.xlsx` or legacy `.xls` (feature-gated behind `excel`).
    Excel,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Options controlling how spreadsheets are read and cleaned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// If `None`, detect format from the file extension.
    pub format: Option<SourceFormat>,
    /// Value written into every missing cell (commonly `""` or `"N/A"`).
    pub placeholder: String,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            format: None,
            placeholder: String::new(),
        }
    }
}

/// Read a spreadsheet file into a cleaned [`Workbook`].
///
/// - CSV files produce one sheet named [`IMPLICIT_SHEET_NAME`].
/// - Excel files produce one sheet per worksheet, in workbook order.
/// - Every returned table satisfies the cleaning rules of [`super::clean_table`].
///
/// # Examples
///
/// ```no_run
/// use sheetload::ingestion::{read_tables, ReaderOptions};
///
/// # fn main() -> Result<(), sheetload::PipelineError> {
/// let workbook = read_tables("data/people.xlsx", &ReaderOptions::default())?;
/// for sheet in &workbook.sheets {
///     println!("{}: {} rows", sheet.name, sheet.table.row_count());
/// }
/// # Ok(())
/// # }
/// ```
pub fn read_tables(path: impl AsRef<Path>, options: &ReaderOptions) -> PipelineResult<Workbook> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => detect_format(path)?,
    };

    let raw: Vec<(String, Table)> = match fmt {
        SourceFormat::Csv => vec![(IMPLICIT_SHEET_NAME.to_string(), csv::read_csv_from_path(path)?)],
        SourceFormat::Excel => read_excel_dispatch(path)?,
    };

    let sheets = raw
        .into_iter()
        .map(|(name, table)| {
            log::debug!("cleaning sheet '{name}' of {}", path.display());
            Sheet {
                name,
                table: clean_table(table, &options.placeholder),
            }
        })
        .collect();

    Ok(Workbook::new(sheets))
}

/// Same as [`read_tables`], reporting the outcome to `observer`.
pub fn read_tables_observed(
    path: impl AsRef<Path>,
    options: &ReaderOptions,
    observer: Option<&dyn PipelineObserver>,
    alert_at_or_above: Severity,
) -> PipelineResult<Workbook> {
    let path = path.as_ref();
    let result = read_tables(path, options);
    observability::report(
        observer,
        &StageContext::new(Stage::Read, path),
        &result,
        |wb| StageStats {
            items: wb.sheets.len(),
            rows: wb.total_rows(),
        },
        alert_at_or_above,
    );
    result
}

/// Detect the source format from the path extension.
pub fn detect_format(path: &Path) -> PipelineResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    SourceFormat::from_extension(ext).ok_or_else(|| PipelineError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: ext.to_string(),
    })
}

fn read_excel_dispatch(path: &Path) -> PipelineResult<Vec<(String, Table)>> {
    #[cfg(feature = "excel")]
    {
        super::excel::read_excel_from_path(path)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: "excel (enable cargo feature 'excel')".to_string(),
        })
    }
}
