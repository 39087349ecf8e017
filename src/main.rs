use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use sheetload::ingestion::ReaderOptions;
use sheetload::loader::{DatabaseConfig, DumpOptions};
use sheetload::observability::{CompositeObserver, FileObserver, LogObserver, PipelineObserver};
use sheetload::pipeline::{check_client_installed, run_pipeline, PipelineConfig};
use sheetload::schema::ColumnPolicy;

/// Convert spreadsheets to JSON, infer SQL schemas, and load them into a database.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Database user.
    #[arg(long)]
    user: String,

    /// Database password.
    #[arg(long, env = "SHEETLOAD_PASSWORD", hide_env_values = true)]
    password: String,

    /// Database host.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Database port (server default when omitted).
    #[arg(long)]
    port: Option<u16>,

    /// Database name.
    #[arg(long, default_value = "Soneras")]
    database: String,

    /// Directory with .csv / .xls / .xlsx inputs.
    #[arg(long, default_value = "./data")]
    input_dir: PathBuf,

    /// Directory for the intermediate JSON files.
    #[arg(long, default_value = "./json")]
    json_dir: PathBuf,

    /// Directory for the generated SQL files.
    #[arg(long, default_value = "./sql")]
    sql_dir: PathBuf,

    /// Text written into missing cells (e.g. "N/A").
    #[arg(long, default_value = "")]
    placeholder: String,

    /// Use the union of keys across all records as columns, not just the first record's.
    #[arg(long)]
    union_columns: bool,

    /// Dump the database after loading.
    #[arg(long)]
    dump: bool,

    /// Directory for database dumps.
    #[arg(long, default_value = "./dumps")]
    dump_dir: PathBuf,

    /// Database client used for the pre-flight check.
    #[arg(long, default_value = "mysql")]
    client_bin: String,

    /// Dump executable.
    #[arg(long, default_value = "mysqldump")]
    dump_bin: String,

    /// Append per-file outcomes to this log file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the run summary as JSON to this file.
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Settings read from the raw arguments before clap parsing. The client check must run before
/// any other argument is validated.
#[derive(Debug, PartialEq, Eq)]
struct Preflight {
    client_bin: String,
    verbose: bool,
    /// `--help` or `--version` was requested; nothing is checked.
    informational: bool,
}

fn preflight(args: impl IntoIterator<Item = String>) -> Preflight {
    let mut out = Preflight {
        client_bin: "mysql".to_string(),
        verbose: false,
        informational: false,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--" => break,
            "-h" | "--help" | "-V" | "--version" => out.informational = true,
            "-v" | "--verbose" => out.verbose = true,
            "--client-bin" => {
                if let Some(bin) = args.next() {
                    out.client_bin = bin;
                }
            }
            other => {
                if let Some(bin) = other.strip_prefix("--client-bin=") {
                    out.client_bin = bin.to_string();
                }
            }
        }
    }
    out
}

fn main() -> anyhow::Result<()> {
    let early = preflight(std::env::args().skip(1));

    if !early.informational {
        let level = if early.verbose { "debug" } else { "info" };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

        if let Err(e) = check_client_installed(&early.client_bin) {
            log::error!("{e}");
            std::process::exit(1);
        }
    }

    let args = Args::parse();

    let mut observers: Vec<Arc<dyn PipelineObserver>> = vec![Arc::new(LogObserver)];
    if let Some(path) = &args.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    let observer = CompositeObserver::new(observers);

    let config = PipelineConfig {
        input_dir: args.input_dir,
        json_dir: args.json_dir,
        sql_dir: args.sql_dir,
        reader: ReaderOptions {
            format: None,
            placeholder: args.placeholder,
        },
        column_policy: if args.union_columns {
            ColumnPolicy::UnionOfKeys
        } else {
            ColumnPolicy::FirstRecord
        },
        database: DatabaseConfig {
            host: args.host,
            port: args.port,
            user: args.user,
            password: args.password,
            database: args.database,
        },
        database_url: None,
        dump: args.dump,
        dump_dir: args.dump_dir,
        dump_options: DumpOptions {
            binary: args.dump_bin,
        },
    };
    log::debug!("running with {config:?}");

    let report = run_pipeline(&config, Some(&observer)).context("pipeline run failed")?;

    log::info!(
        "done: {} inputs read ({} skipped), {} JSON files, {} SQL files ({} skipped)",
        report.files_read.len(),
        report.files_failed.len(),
        report.json_written.len(),
        report.infer.written.len(),
        report.infer.failed.len()
    );
    match &report.load {
        Some(load) => log::info!(
            "database: {} statements executed, {} failed",
            load.executed(),
            load.failure_count()
        ),
        None => log::warn!("database: nothing loaded"),
    }

    if let Some(path) = &args.report_json {
        let text = serde_json::to_string_pretty(&report).context("serializing run report")?;
        std::fs::write(path, text).with_context(|| format!("writing report to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn early(args: &[&str]) -> Preflight {
        preflight(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn client_bin_is_found_without_other_arguments() {
        assert_eq!(
            early(&["--client-bin", "/opt/mysql/bin/mysql"]),
            Preflight {
                client_bin: "/opt/mysql/bin/mysql".to_string(),
                verbose: false,
                informational: false,
            }
        );
        assert_eq!(early(&["--client-bin=mariadb", "-v"]).client_bin, "mariadb");
        assert!(early(&["--client-bin=mariadb", "-v"]).verbose);
        assert_eq!(early(&["--no-such-flag"]).client_bin, "mysql");
    }

    #[test]
    fn help_and_version_skip_the_check() {
        assert!(early(&["--help"]).informational);
        assert!(early(&["-V"]).informational);
        assert!(!early(&["--user", "etl"]).informational);
        assert_eq!(early(&["--", "--client-bin", "x"]).client_bin, "mysql");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
