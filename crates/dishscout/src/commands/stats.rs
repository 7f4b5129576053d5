//! Stats command — report what the loaders kept and skipped.

use clap::Args;
use dishscout_core::{CatalogReport, CorpusReport, LoadReport};
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

/// Arguments for the `stats` subcommand.
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Exit with an error if either dataset file could not be read
    #[arg(long)]
    pub strict: bool,
}

/// Print the load report for the configured dataset.
#[instrument(name = "cmd_stats", skip_all, fields(strict = args.strict))]
pub fn cmd_stats(args: StatsArgs, global_json: bool, report: &LoadReport) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing stats command");

    if global_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_catalog(&report.businesses);
        println!();
        print_corpus(&report.reviews);
    }

    if args.strict && report.has_source_errors() {
        anyhow::bail!("dataset could not be read completely");
    }
    Ok(())
}

fn print_source(source: Option<&str>, error: Option<&str>) {
    if let Some(source) = source {
        println!("{}: {}", "Source".dimmed(), source.cyan());
    }
    if let Some(error) = error {
        println!("{}: {}", "Error".dimmed(), error.red());
    }
}

fn print_catalog(report: &CatalogReport) {
    println!("{}", "Businesses".bold().underline());
    print_source(report.source.as_deref(), report.source_error.as_deref());
    println!("{}: {}", "Lines".dimmed(), report.lines);
    println!("{}: {}", "Malformed".dimmed(), report.malformed);
    println!("{}: {}", "Missing fields".dimmed(), report.missing_fields);
    println!("{}: {}", "Open".dimmed(), report.open);
    println!("{}: {}", "Open with location".dimmed(), report.geo_tagged);
    println!("{}: {}", "Duplicates replaced".dimmed(), report.replaced);
    println!("{}: {}", "Loaded".dimmed(), report.loaded.green());
}

fn print_corpus(report: &CorpusReport) {
    println!("{}", "Reviews".bold().underline());
    print_source(report.source.as_deref(), report.source_error.as_deref());
    println!("{}: {}", "Lines".dimmed(), report.lines);
    println!("{}: {}", "Malformed".dimmed(), report.malformed);
    println!("{}: {}", "Missing fields".dimmed(), report.missing_fields);
    println!("{}: {}", "Unknown business".dimmed(), report.unknown_business);
    println!("{}: {}", "Retained".dimmed(), report.retained.green());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_source() -> LoadReport {
        LoadReport {
            businesses: CatalogReport {
                source_error: Some("not found".to_string()),
                ..CatalogReport::default()
            },
            reviews: CorpusReport::default(),
        }
    }

    #[test]
    fn stats_text_succeeds() {
        assert!(cmd_stats(StatsArgs::default(), false, &LoadReport::default()).is_ok());
    }

    #[test]
    fn stats_json_succeeds() {
        assert!(cmd_stats(StatsArgs::default(), true, &missing_source()).is_ok());
    }

    #[test]
    fn strict_fails_on_source_error() {
        let err = cmd_stats(StatsArgs { strict: true }, false, &missing_source()).unwrap_err();
        assert!(err.to_string().contains("could not be read"));
    }
}
