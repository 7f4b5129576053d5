//! Library interface for the `dishscout` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for documentation generation and testing. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations
//! - `server` - MCP server (feature `mcp`)
//! - `http` - HTTP JSON API (feature `http`)

pub mod commands;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "mcp")]
pub mod server;

use camino::Utf8PathBuf;
use clap::{CommandFactory, Parser, Subcommand};
use dishscout_core::{Config, DataPaths};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                  Log filter (e.g., debug, dishscout_core=trace)
    DISHSCOUT_LOG_PATH        Explicit log file path
    DISHSCOUT_LOG_DIR         Log directory
    DISHSCOUT_BUSINESS_FILE   Business dataset (newline-delimited JSON)
    DISHSCOUT_REVIEW_FILE     Review dataset (newline-delimited JSON)
";

/// Command-line interface definition for dishscout.
#[derive(Parser)]
#[command(name = "dishscout")]
#[command(about = "Find the restaurants reviewers rave about for a given dish", long_about = None)]
#[command(version, arg_required_else_help = true)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print only the version number (for scripting)
    #[arg(long)]
    pub version_only: bool,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Business dataset (overrides configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub business_file: Option<Utf8PathBuf>,

    /// Review dataset (overrides configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub review_file: Option<Utf8PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

impl Cli {
    /// Dataset locations: command-line flags first, then configuration.
    pub fn data_paths(&self, config: &Config) -> DataPaths {
        let configured = config.data_paths();
        DataPaths {
            business_file: self
                .business_file
                .clone()
                .unwrap_or(configured.business_file),
            review_file: self.review_file.clone().unwrap_or(configured.review_file),
        }
    }
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Rank restaurants by mentions of a dish
    #[command(aliases = ["se"])]
    Search(commands::search::SearchArgs),

    /// Load the datasets and report what was kept
    Stats(commands::stats::StatsArgs),

    /// Show package information
    Info(commands::info::InfoArgs),

    /// Start MCP (Model Context Protocol) server on stdio
    #[cfg(feature = "mcp")]
    Serve(commands::serve::ServeArgs),

    /// Start the HTTP JSON API
    #[cfg(feature = "http")]
    Web(commands::web::WebArgs),
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}
