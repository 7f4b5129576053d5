//! Search command — rank restaurants by mentions of a dish.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use dishscout_core::search::{self, SearchDefaults, SearchOutcome, SearchRequest, ViewMode};
use dishscout_core::{Dataset, MapView};

/// Width of the score bar at the top score.
const BAR_WIDTH: usize = 30;

/// Longest restaurant name shown before truncation.
const MAX_NAME_WIDTH: usize = 40;

/// Arguments for the `search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Dish to look for (words are joined with spaces; case does not matter).
    #[arg(required = true, num_args = 1.., value_name = "DISH")]
    pub dish: Vec<String>,

    /// Minimum total mentions across a restaurant's reviews.
    #[arg(long)]
    pub min_mentions: Option<u32>,

    /// Minimum number of reviews that mention the dish.
    #[arg(long)]
    pub min_reviews: Option<u32>,

    /// Number of restaurants to display.
    #[arg(short = 'n', long)]
    pub num_display: Option<usize>,

    /// Presentation: ranked list, or list plus map markers.
    #[arg(long, value_enum, default_value_t)]
    pub view: ViewMode,

    /// Write the map as GeoJSON to FILE instead of stdout (map view only).
    #[arg(long, value_name = "FILE")]
    pub map_out: Option<Utf8PathBuf>,
}

impl SearchArgs {
    fn to_request(&self) -> SearchRequest {
        SearchRequest {
            dish: self.dish.join(" "),
            min_mentions: self.min_mentions,
            min_reviews: self.min_reviews,
            num_display: self.num_display,
            view: self.view,
        }
    }
}

/// Rank restaurants for a dish and print the results.
#[instrument(name = "cmd_search", skip_all, fields(dish = ?args.dish))]
pub fn cmd_search(
    args: SearchArgs,
    global_json: bool,
    dataset: &Dataset,
    defaults: &SearchDefaults,
) -> anyhow::Result<()> {
    debug!(view = ?args.view, num_display = ?args.num_display, "executing search command");

    let request = args.to_request();
    let outcome = search::run_search(dataset, &request, defaults)?;

    if let (Some(map), Some(path)) = (&outcome.map, &args.map_out) {
        write_geojson(map, path)?;
    }

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for notice in &outcome.notices {
        eprintln!("{} {}", "note:".yellow(), notice.message);
    }

    match (&outcome.map, &args.map_out) {
        (Some(_), Some(path)) => {
            print_table(&outcome);
            println!("\n{} {}", "Map written to".dimmed(), path.cyan());
        }
        (Some(map), None) => {
            println!("{}", serde_json::to_string_pretty(&map.to_geojson())?);
        }
        (None, _) => print_table(&outcome),
    }

    Ok(())
}

fn write_geojson(map: &MapView, path: &Utf8PathBuf) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(&map.to_geojson())?;
    std::fs::write(path.as_std_path(), body).with_context(|| format!("failed to write {path}"))
}

fn print_table(outcome: &SearchOutcome) {
    if outcome.recommendations.is_empty() {
        return;
    }

    let label = search::title_case(&outcome.dish);
    println!(
        "{} {}",
        format!("Top matches for '{label}'").bold(),
        format!(
            "(at least {} mentions in {} reviews)",
            outcome.min_mentions, outcome.min_reviews
        )
        .dimmed(),
    );

    let name_width = outcome
        .recommendations
        .iter()
        .map(|r| r.name.chars().count().min(MAX_NAME_WIDTH))
        .max()
        .unwrap_or(0)
        .max("Restaurant".len());
    let top = outcome
        .recommendations
        .first()
        .map_or(0.0, |r| r.score);

    println!(
        "\n{:>4}  {:<name_width$}  {:>8}  {:>8}  {:>7}",
        "#".dimmed(),
        "Restaurant".dimmed(),
        "Score".dimmed(),
        "Mentions".dimmed(),
        "Reviews".dimmed(),
    );
    for (i, r) in outcome.recommendations.iter().enumerate() {
        println!(
            "{:>4}  {:<name_width$}  {:>8.1}  {:>8}  {:>7}  {}",
            format!("{}.", i + 1),
            truncate(&r.name, MAX_NAME_WIDTH),
            r.score,
            r.mentions,
            r.reviews,
            score_bar(r.score, top, BAR_WIDTH).green(),
        );
        println!("{:>4}  {}", "", r.address.dimmed());
    }
}

/// A bar of `width` cells scaled so `top` fills it; at least one cell for any
/// positive score.
fn score_bar(score: f64, top: f64, width: usize) -> String {
    if top <= 0.0 || score <= 0.0 {
        return String::new();
    }
    let cells = ((score / top) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
