//! Logging setup: human-readable events on stderr, optional JSONL file.
//!
//! The file sink is chosen in this order:
//!
//! 1. `DISHSCOUT_LOG_PATH` - one explicit file, never rotated
//! 2. `DISHSCOUT_LOG_DIR`, then the configured `log_dir` - daily files
//! 3. no file logging
//!
//! The returned [`ObservabilityGuard`] flushes the file writer on drop and
//! must be held until the process exits.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "DISHSCOUT_LOG_PATH";
const ENV_LOG_DIR: &str = "DISHSCOUT_LOG_DIR";
const LOG_FILE_PREFIX: &str = "dishscout.jsonl";

/// Where JSONL logs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFile {
    /// A single file at an explicit path.
    Fixed(PathBuf),
    /// Daily-rotated files in a directory.
    Daily(PathBuf),
}

/// Resolved logging destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// JSONL sink, if any.
    pub log_file: Option<LogFile>,
}

impl ObservabilityConfig {
    /// Resolve from the environment, with `log_dir` from configuration as
    /// the fallback directory.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
            std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
            log_dir,
        )
    }

    fn resolve(
        env_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        let log_file = env_path
            .filter(|p| !p.as_os_str().is_empty())
            .map(LogFile::Fixed)
            .or_else(|| {
                env_dir
                    .filter(|p| !p.as_os_str().is_empty())
                    .or(config_dir)
                    .map(LogFile::Daily)
            });
        Self { log_file }
    }
}

/// Build the event filter: `RUST_LOG` wins, then the CLI verbosity flags,
/// then the configured level.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(level_directive(quiet, verbose, default_level))
}

fn level_directive(quiet: bool, verbose: u8, default_level: &str) -> &str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => default_level,
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Keeps the non-blocking file writer alive.
#[derive(Debug)]
pub struct ObservabilityGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<ObservabilityGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match &config.log_file {
        Some(target) => {
            let appender = file_appender(target)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(ObservabilityGuard { _file: guard })
}

fn file_appender(target: &LogFile) -> anyhow::Result<tracing_appender::rolling::RollingFileAppender> {
    match target {
        LogFile::Fixed(path) => {
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log path has no file name: {}", path.display()))?;
            create_dir(dir)?;
            Ok(tracing_appender::rolling::never(dir, name))
        }
        LogFile::Daily(dir) => {
            create_dir(dir)?;
            Ok(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
        }
    }
}

fn create_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let config = ObservabilityConfig::resolve(
            Some(PathBuf::from("/tmp/x.jsonl")),
            Some(PathBuf::from("/tmp/env")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(
            config.log_file,
            Some(LogFile::Fixed(PathBuf::from("/tmp/x.jsonl")))
        );
    }

    #[test]
    fn env_dir_beats_config_dir() {
        let config = ObservabilityConfig::resolve(
            None,
            Some(PathBuf::from("/tmp/env")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(config.log_file, Some(LogFile::Daily(PathBuf::from("/tmp/env"))));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = ObservabilityConfig::resolve(
            Some(PathBuf::new()),
            Some(PathBuf::new()),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(
            config.log_file,
            Some(LogFile::Daily(PathBuf::from("/tmp/config")))
        );
    }

    #[test]
    fn no_sources_means_no_file() {
        assert_eq!(ObservabilityConfig::resolve(None, None, None).log_file, None);
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_directive(true, 2, "info"), "error");
        assert_eq!(level_directive(false, 0, "warn"), "warn");
        assert_eq!(level_directive(false, 1, "warn"), "debug");
        assert_eq!(level_directive(false, 3, "warn"), "trace");
    }

    #[test]
    fn fixed_file_creates_parent_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("run.jsonl");

        assert!(file_appender(&LogFile::Fixed(path)).is_ok());
        assert!(tmp.path().join("nested").is_dir());
    }
}
