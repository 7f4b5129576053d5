//! Info command implementation

use clap::Args;
use dishscout_core::DataPaths;
use dishscout_core::config::{Config, ConfigSources};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    business_file: String,
    review_file: String,
    min_mentions: u32,
    min_reviews: u32,
    num_display: usize,
    max_display: usize,
    listen: String,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources, paths: &DataPaths) -> Self {
        let defaults = config.search_defaults();
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            business_file: paths.business_file.to_string(),
            review_file: paths.review_file.to_string(),
            min_mentions: defaults.min_mentions,
            min_reviews: defaults.min_reviews,
            num_display: defaults.num_display,
            max_display: defaults.max_display,
            listen: config.listen_addr().to_string(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information and the effective configuration.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `sources` - Config source metadata from loading
/// * `paths` - Dataset locations after command-line overrides
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
    paths: &DataPaths,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let full_info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, sources, paths),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
        return Ok(());
    }

    let package = &full_info.package;
    println!("{} {}", package.name.bold(), package.version.green());
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), package.license);
    }
    if !package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), package.repository.cyan());
    }

    let config = &full_info.config;
    println!();
    println!("{}", "Configuration".bold().underline());
    match config.config_file {
        Some(ref path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    println!("{}: {}", "Log level".dimmed(), config.log_level);
    if let Some(ref dir) = config.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }
    println!("{}: {}", "Listen".dimmed(), config.listen);

    println!();
    println!("{}", "Data".bold().underline());
    println!("{}: {}", "Businesses".dimmed(), config.business_file);
    println!("{}: {}", "Reviews".dimmed(), config.review_file);

    println!();
    println!("{}", "Search Defaults".bold().underline());
    println!("{}: {}", "Min mentions".dimmed(), config.min_mentions);
    println!("{}: {}", "Min reviews".dimmed(), config.min_reviews);
    println!(
        "{}: {} (max {})",
        "Results shown".dimmed(),
        config.num_display,
        config.max_display
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths() -> DataPaths {
        Config::default().data_paths()
    }

    #[test]
    fn test_cmd_info_text_succeeds() {
        let result = cmd_info(
            InfoArgs::default(),
            false,
            &Config::default(),
            &ConfigSources::default(),
            &test_paths(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_cmd_info_json_succeeds() {
        let result = cmd_info(
            InfoArgs::default(),
            true,
            &Config::default(),
            &ConfigSources::default(),
            &test_paths(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn config_info_applies_defaults() {
        let info = ConfigInfo::from_config(
            &Config::default(),
            &ConfigSources::default(),
            &test_paths(),
        );
        assert_eq!(info.min_mentions, 5);
        assert_eq!(info.min_reviews, 2);
        assert_eq!(info.num_display, 10);
        assert_eq!(info.max_display, 500);
        assert_eq!(info.listen, "127.0.0.1:5000");
        assert!(info.config_file.is_none());
    }

    #[test]
    fn config_info_reports_overridden_paths() {
        let paths = DataPaths {
            business_file: "b.json".into(),
            review_file: "r.json".into(),
        };
        let info = ConfigInfo::from_config(&Config::default(), &ConfigSources::default(), &paths);
        assert_eq!(info.business_file, "b.json");
        assert_eq!(info.review_file, "r.json");
    }
}
