//! Observer hooks for per-file pipeline outcomes.
//!
//! Every stage reports each input file to an optional [`PipelineObserver`]. Failures are
//! classified with [`severity_for_error`], and those at or above a threshold are also raised
//! through [`PipelineObserver::on_alert`]. [`LogObserver`] forwards to the `log` facade,
//! [`FileObserver`] appends lines to a file, and [`CompositeObserver`] fans out to several.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::PipelineError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (one file or statement failed).
    Error,
    /// Critical error (I/O, connectivity, missing tooling).
    Critical,
}

/// Pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Export,
    Infer,
    Load,
    Dump,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Read => "read",
            Stage::Export => "export",
            Stage::Infer => "infer",
            Stage::Load => "load",
            Stage::Dump => "dump",
        };
        f.write_str(s)
    }
}

/// Context about one unit of work (usually one file).
#[derive(Debug, Clone)]
pub struct StageContext {
    pub stage: Stage,
    /// The file or directory being processed.
    pub path: PathBuf,
}

impl StageContext {
    pub fn new(stage: Stage, path: impl AsRef<Path>) -> Self {
        Self {
            stage,
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// Minimal stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageStats {
    /// Sheets read, files written, or statements executed, depending on the stage.
    pub items: usize,
    /// Rows or records involved.
    pub rows: usize,
}

/// Observer interface for stage outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called when a unit of work succeeds.
    fn on_success(&self, _ctx: &StageContext, _stats: StageStats) {}

    /// Called when a unit of work fails.
    fn on_failure(&self, _ctx: &StageContext, _severity: Severity, _error: &PipelineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Classify an error for observers.
pub fn severity_for_error(e: &PipelineError) -> Severity {
    match e {
        PipelineError::Io(_) => Severity::Critical,
        PipelineError::Connection { .. } => Severity::Critical,
        PipelineError::ClientUnavailable { .. } => Severity::Critical,
        PipelineError::Dump { .. } => Severity::Critical,
        PipelineError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        #[cfg(feature = "excel")]
        PipelineError::Excel(_) => Severity::Error,
        PipelineError::Json(_) => Severity::Error,
        PipelineError::StatementExecution { .. } => Severity::Error,
        PipelineError::Database(_) => Severity::Error,
        PipelineError::UnsupportedFormat { .. } => Severity::Warning,
        PipelineError::SchemaInference { .. } => Severity::Warning,
    }
}

/// Report a result to an optional observer, alerting at or above `alert_at_or_above`.
pub fn report<T>(
    observer: Option<&dyn PipelineObserver>,
    ctx: &StageContext,
    result: &Result<T, PipelineError>,
    stats: impl FnOnce(&T) -> StageStats,
    alert_at_or_above: Severity,
) {
    let Some(obs) = observer else {
        return;
    };
    match result {
        Ok(value) => obs.on_success(ctx, stats(value)),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_success(&self, ctx: &StageContext, stats: StageStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards stage events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_success(&self, ctx: &StageContext, stats: StageStats) {
        log::info!(
            "[{}][ok] path={} items={} rows={}",
            ctx.stage,
            ctx.path.display(),
            stats.items,
            stats.rows
        );
    }

    fn on_failure(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        match severity {
            Severity::Info => log::info!("[{}] path={} {}", ctx.stage, ctx.path.display(), error),
            Severity::Warning => log::warn!("[{}] path={} {}", ctx.stage, ctx.path.display(), error),
            Severity::Error | Severity::Critical => {
                log::error!("[{}][{:?}] path={} {}", ctx.stage, severity, ctx.path.display(), error)
            }
        }
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        log::error!(
            "[ALERT][{}][{:?}] path={} {}",
            ctx.stage,
            severity,
            ctx.path.display(),
            error
        );
    }
}

/// Appends stage events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_success(&self, ctx: &StageContext, stats: StageStats) {
        self.append_line(&format!(
            "{} ok stage={} path={} items={} rows={}",
            timestamp(),
            ctx.stage,
            ctx.path.display(),
            stats.items,
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "{} fail severity={:?} stage={} path={} err={}",
            timestamp(),
            severity,
            ctx.stage,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} stage={} path={} err={}",
            timestamp(),
            severity,
            ctx.stage,
            ctx.path.display(),
            error
        ));
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl PipelineObserver for Recording {
        fn on_success(&self, ctx: &StageContext, stats: StageStats) {
            self.events
                .lock()
                .unwrap()
                .push(format!("ok:{}:{}", ctx.stage, stats.rows));
        }

        fn on_failure(&self, _ctx: &StageContext, severity: Severity, _error: &PipelineError) {
            self.events.lock().unwrap().push(format!("fail:{severity:?}"));
        }
    }

    #[test]
    fn report_alerts_only_at_threshold() {
        let obs = Recording::default();
        let ctx = StageContext::new(Stage::Infer, "a.json");

        let warn: Result<(), PipelineError> = Err(PipelineError::SchemaInference {
            message: "empty".to_string(),
        });
        report(Some(&obs), &ctx, &warn, |_| StageStats::default(), Severity::Error);

        let io: Result<(), PipelineError> = Err(std::io::Error::other("boom").into());
        report(Some(&obs), &ctx, &io, |_| StageStats::default(), Severity::Error);

        let ok: Result<usize, PipelineError> = Ok(4);
        report(
            Some(&obs),
            &ctx,
            &ok,
            |n| StageStats { items: 1, rows: *n },
            Severity::Error,
        );

        // The critical failure is reported twice: once as failure, once via the default on_alert.
        assert_eq!(
            *obs.events.lock().unwrap(),
            vec!["fail:Warning", "fail:Critical", "fail:Critical", "ok:infer:4"]
        );
    }

    #[test]
    fn file_observer_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");
        let obs = FileObserver::new(&path);
        let ctx = StageContext::new(Stage::Read, "people.csv");

        obs.on_success(&ctx, StageStats { items: 1, rows: 2 });
        obs.on_failure(
            &ctx,
            Severity::Error,
            &PipelineError::SchemaInference {
                message: "x".to_string(),
            },
        );

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ok stage=read path=people.csv items=1 rows=2"));
        assert!(lines[1].contains("fail severity=Error stage=read"));
    }
}
