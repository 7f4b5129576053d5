//! Review corpus loading.
//!
//! The corpus is the second phase of dataset initialization: it needs a
//! finished [`Catalog`] and keeps only reviews whose business is in it.
//! Review text is lowercased exactly once, here, so queries can match
//! against it directly.

use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::Utf8Path;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::error::LoadError;
use crate::ndjson;

/// A review retained in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    business_id: String,
    stars: f64,
    text: String,
}

impl ReviewRecord {
    /// Create a review, case-folding its text.
    pub fn new(business_id: impl Into<String>, stars: f64, text: &str) -> Self {
        Self {
            business_id: business_id.into(),
            stars,
            text: text.to_lowercase(),
        }
    }

    /// Identifier of the reviewed business.
    pub fn business_id(&self) -> &str {
        &self.business_id
    }

    /// Star rating, nominally 1 to 5.
    pub const fn stars(&self) -> f64 {
        self.stars
    }

    /// Lowercased review text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Deserialize)]
struct RawReview {
    business_id: Option<String>,
    stars: Option<f64>,
    text: Option<String>,
}

/// Diagnostic counters from one corpus load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CorpusReport {
    /// Source path, when loaded from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Why the source could not be read (fully or partially).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    /// Lines consumed, blank lines included.
    pub lines: usize,
    /// Lines skipped because they were not valid JSON.
    pub malformed: usize,
    /// Reviews lacking `business_id`, `stars` or `text`.
    pub missing_fields: usize,
    /// Reviews of businesses absent from the catalog.
    pub unknown_business: usize,
    /// Reviews kept in the corpus.
    pub retained: usize,
}

/// Immutable, ordered collection of retained reviews.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    reviews: Vec<ReviewRecord>,
}

impl Corpus {
    /// Build the corpus from newline-delimited review JSON.
    ///
    /// Reviews keep their source order.
    #[tracing::instrument(skip(reader, catalog), fields(catalog_len = catalog.len()))]
    pub fn from_reader<R: BufRead>(reader: R, catalog: &Catalog) -> (Self, CorpusReport) {
        let mut reviews = Vec::new();
        let mut report = CorpusReport::default();

        let scanned = ndjson::for_each_record(reader, |line, parsed: Result<RawReview, _>| {
            let raw = match parsed {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(line, error = %e, "skipping unparseable review line");
                    report.malformed += 1;
                    return;
                }
            };
            let RawReview {
                business_id: Some(business_id),
                stars: Some(stars),
                text: Some(text),
            } = raw
            else {
                warn!(line, "skipping review with missing field");
                report.missing_fields += 1;
                return;
            };

            if !catalog.contains(&business_id) {
                report.unknown_business += 1;
                return;
            }
            reviews.push(ReviewRecord::new(business_id, stars, &text));
        });

        match scanned {
            Ok(lines) => report.lines = lines,
            Err(e) => {
                warn!(error = %e, "review data truncated");
                if let LoadError::Read { line, .. } = e {
                    report.lines = line;
                }
                report.source_error = Some(e.to_string());
            }
        }
        report.retained = reviews.len();

        info!(
            lines = report.lines,
            retained = report.retained,
            unknown_business = report.unknown_business,
            malformed = report.malformed,
            "review corpus loaded"
        );
        (Self { reviews }, report)
    }

    /// Load the corpus from a file.
    ///
    /// A missing or unreadable file yields an empty corpus; the failure is
    /// logged and recorded in the report's `source_error`.
    #[tracing::instrument(skip(catalog))]
    pub fn load(path: &Utf8Path, catalog: &Catalog) -> (Self, CorpusReport) {
        let (corpus, mut report) = match File::open(path.as_std_path()) {
            Ok(file) => Self::from_reader(BufReader::new(file), catalog),
            Err(source) => {
                let e = LoadError::Open {
                    path: path.to_path_buf(),
                    source,
                };
                warn!(error = %e, "review data unavailable; corpus is empty");
                let report = CorpusReport {
                    source_error: Some(e.to_string()),
                    ..CorpusReport::default()
                };
                (Self::default(), report)
            }
        };
        report.source = Some(path.to_string());
        (corpus, report)
    }

    /// Number of reviews.
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    /// Whether the corpus holds no reviews.
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Iterate over reviews in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReviewRecord> {
        self.reviews.iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a ReviewRecord;
    type IntoIter = std::slice::Iter<'a, ReviewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.iter()
    }
}

impl FromIterator<ReviewRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = ReviewRecord>>(iter: I) -> Self {
        Self {
            reviews: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BusinessRecord;
    use tempfile::TempDir;

    fn catalog_of(ids: &[&str]) -> Catalog {
        ids.iter()
            .map(|id| BusinessRecord {
                business_id: (*id).to_string(),
                name: id.to_uppercase(),
                address: String::new(),
                latitude: 0.0,
                longitude: 0.0,
                categories: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn keeps_only_reviews_of_catalogued_businesses() {
        let catalog = catalog_of(&["known"]);
        let input = [
            r#"{"business_id":"known","stars":5,"text":"Great"}"#,
            r#"{"business_id":"stranger","stars":4,"text":"Fine"}"#,
            r#"{"business_id":"known","stars":3.5,"text":"OK"}"#,
        ]
        .join("\n");
        let (corpus, report) = Corpus::from_reader(input.as_bytes(), &catalog);

        assert_eq!(corpus.len(), 2);
        assert_eq!(report.retained, 2);
        assert_eq!(report.unknown_business, 1);
        assert!(corpus.iter().all(|r| r.business_id() == "known"));
        assert_eq!(corpus.iter().nth(1).unwrap().stars(), 3.5);
    }

    #[test]
    fn lowercases_text_at_load() {
        let catalog = catalog_of(&["b"]);
        let input = r#"{"business_id":"b","stars":5,"text":"Best TACOS in Town"}"#;
        let (corpus, _) = Corpus::from_reader(input.as_bytes(), &catalog);
        assert_eq!(corpus.iter().next().unwrap().text(), "best tacos in town");
    }

    #[test]
    fn tolerates_bad_lines() {
        let catalog = catalog_of(&["b"]);
        let input = [
            "garbage",
            r#"{"business_id":"b","text":"no stars"}"#,
            r#"{"business_id":"b","stars":2,"text":"fine"}"#,
        ]
        .join("\n");
        let (corpus, report) = Corpus::from_reader(input.as_bytes(), &catalog);

        assert_eq!(corpus.len(), 1);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.missing_fields, 1);
        assert_eq!(report.lines, 3);
    }

    #[test]
    fn empty_catalog_retains_nothing() {
        let catalog = Catalog::default();
        let input = r#"{"business_id":"b","stars":5,"text":"hello"}"#;
        let (corpus, report) = Corpus::from_reader(input.as_bytes(), &catalog);
        assert!(corpus.is_empty());
        assert_eq!(report.unknown_business, 1);
    }

    #[test]
    fn missing_file_yields_empty_corpus() {
        let tmp = TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::try_from(tmp.path().join("reviews.json")).unwrap();
        let (corpus, report) = Corpus::load(&path, &catalog_of(&["b"]));

        assert!(corpus.is_empty());
        assert!(report.source_error.is_some());
    }

    /// Fails every read.
    struct Broken;

    impl std::io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("connection reset"))
        }
    }

    #[test]
    fn read_failure_keeps_reviews_read_so_far() {
        use std::io::Read;

        let head: &[u8] = b"{\"business_id\":\"b\",\"stars\":4,\"text\":\"Soup\"}\n";
        let reader = std::io::BufReader::new(head.chain(Broken));
        let (corpus, report) = Corpus::from_reader(reader, &catalog_of(&["b"]));

        assert_eq!(corpus.len(), 1);
        assert_eq!(report.retained, 1);
        assert_eq!(report.lines, 1);
        assert!(report.source_error.as_deref().unwrap().contains("connection reset"));
    }
}
