//! Command implementations.

use std::time::Duration;

use dishscout_core::{Catalog, DataPaths, Dataset, LoadReport};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::instrument;

pub mod info;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod search;
pub mod stats;
#[cfg(feature = "http")]
pub mod web;

/// Load the catalog, then the reviews against it, with a spinner on stderr.
///
/// Missing files are not an error here: the loaders return empty
/// collections and the returned report says why.
#[instrument(skip_all, fields(business = %paths.business_file, reviews = %paths.review_file))]
pub fn load_dataset(paths: &DataPaths, show_progress: bool) -> (Dataset, LoadReport) {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    } else {
        ProgressBar::hidden()
    };

    spinner.set_message(format!("loading businesses from {}", paths.business_file));
    let (catalog, businesses) = Catalog::load(&paths.business_file);

    spinner.set_message(format!("loading reviews from {}", paths.review_file));
    let (dataset, reviews) = Dataset::with_review_file(catalog, &paths.review_file);

    spinner.finish_and_clear();
    (
        dataset,
        LoadReport {
            businesses,
            reviews,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_dataset_reads_both_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("b.json"),
            r#"{"business_id":"b","name":"Bistro","latitude":1.0,"longitude":1.0,"open":true}"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("r.json"),
            r#"{"business_id":"b","stars":4,"text":"Lovely soup"}"#,
        )
        .unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        let (dataset, report) = load_dataset(
            &DataPaths {
                business_file: root.join("b.json"),
                review_file: root.join("r.json"),
            },
            false,
        );

        assert_eq!(dataset.catalog().len(), 1);
        assert_eq!(dataset.corpus().len(), 1);
        assert!(!report.has_source_errors());
    }
}
