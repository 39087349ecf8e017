//! Database backup through the native dump tool.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use chrono::{Local, NaiveDateTime};

use crate::error::{PipelineError, PipelineResult};

use super::config::DatabaseConfig;

/// Options for [`create_dump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Dump executable, resolved through `PATH` unless absolute.
    pub binary: String,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            binary: "mysqldump".to_string(),
        }
    }
}

/// `<database>_dump_<YYYYmmddHHMMSS>.sql`
pub fn dump_file_name(database: &str, at: NaiveDateTime) -> String {
    format!("{database}_dump_{}.sql", at.format("%Y%m%d%H%M%S"))
}

/// Arguments passed to the dump tool. The password is never among them.
pub fn dump_args(config: &DatabaseConfig) -> Vec<String> {
    let mut args = vec!["-u".to_string(), config.user.clone()];
    args.push("-h".to_string());
    args.push(config.host.clone());
    if let Some(port) = config.port {
        args.push("-P".to_string());
        args.push(port.to_string());
    }
    args.push(config.database.clone());
    args
}

/// Dump tool invocation for `config`, without stdio wiring.
///
/// A non-empty password is handed over in the `MYSQL_PWD` environment variable so it does not
/// show up in the process list.
pub fn dump_command(config: &DatabaseConfig, options: &DumpOptions) -> Command {
    let mut cmd = Command::new(&options.binary);
    cmd.args(dump_args(config));
    if !config.password.is_empty() {
        cmd.env("MYSQL_PWD", &config.password);
    }
    cmd
}

/// Dump the whole database into a timestamped file under `dump_dir`.
///
/// Returns the path of the dump. A missing binary or a non-zero exit yields
/// [`PipelineError::Dump`] and removes the partial file.
pub fn create_dump(
    config: &DatabaseConfig,
    dump_dir: impl AsRef<Path>,
    options: &DumpOptions,
) -> PipelineResult<PathBuf> {
    let dump_dir = dump_dir.as_ref();
    fs::create_dir_all(dump_dir)?;
    let path = dump_dir.join(dump_file_name(&config.database, Local::now().naive_local()));
    let out = File::create(&path)?;

    let status = dump_command(config, options)
        .stdin(Stdio::null())
        .stdout(Stdio::from(out))
        .status();

    let failure = match status {
        Ok(s) if s.success() => None,
        Ok(s) => Some(format!("{} exited with {s}", options.binary)),
        Err(e) => Some(format!("could not run {}: {e}", options.binary)),
    };

    match failure {
        None => {
            log::info!("database dump created: {}", path.display());
            Ok(path)
        }
        Some(message) => {
            if let Err(e) = fs::remove_file(&path) {
                log::debug!("could not remove partial dump {}: {e}", path.display());
            }
            Err(PipelineError::Dump { message })
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn file_name_carries_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(dump_file_name("Soneras", at), "Soneras_dump_20240309070501.sql");
    }

    #[test]
    fn args_include_port_only_when_set() {
        let mut cfg = DatabaseConfig {
            user: "u".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        assert_eq!(dump_args(&cfg), vec!["-u", "u", "-h", "localhost", "Soneras"]);

        cfg.port = Some(3307);
        cfg.password.clear();
        assert_eq!(
            dump_args(&cfg),
            vec!["-u", "u", "-h", "localhost", "-P", "3307", "Soneras"]
        );
    }

    #[test]
    fn password_goes_to_environment_not_arguments() {
        let cfg = DatabaseConfig {
            password: "s3cret".to_string(),
            ..Default::default()
        };
        let cmd = dump_command(&cfg, &DumpOptions::default());

        assert_eq!(cmd.get_program(), "mysqldump");
        assert!(cmd
            .get_args()
            .all(|a| !a.to_string_lossy().contains("s3cret")));
        let pwd: Vec<_> = cmd
            .get_envs()
            .filter(|(k, _)| *k == "MYSQL_PWD")
            .map(|(_, v)| v.map(|v| v.to_os_string()))
            .collect();
        assert_eq!(pwd, vec![Some("s3cret".into())]);

        let no_pwd = dump_command(&DatabaseConfig::default(), &DumpOptions::default());
        assert_eq!(no_pwd.get_envs().count(), 0);
    }

    #[test]
    fn missing_binary_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let opts = DumpOptions {
            binary: "sheetload-no-such-dump-tool".to_string(),
        };
        let err = create_dump(&DatabaseConfig::default(), dir.path(), &opts).unwrap_err();
        assert!(matches!(err, PipelineError::Dump { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
