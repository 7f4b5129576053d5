//! Two-phase dataset initialization.
//!
//! Phase one builds the [`Catalog`]; phase two consumes the finished catalog
//! to filter reviews into the [`Corpus`]. The resulting [`Dataset`] owns both
//! and exposes them read-only, so it can be shared across threads (behind an
//! `Arc`) and queried concurrently without locking.

use std::io::BufRead;

use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogReport};
use crate::corpus::{Corpus, CorpusReport};
use crate::error::QueryResult;
use crate::recommend::{self, RecommendQuery, Recommendation};

/// Locations of the two dataset files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Newline-delimited business JSON.
    pub business_file: Utf8PathBuf,
    /// Newline-delimited review JSON.
    pub review_file: Utf8PathBuf,
}

/// Combined diagnostics from both loaders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LoadReport {
    /// Business catalog counters.
    pub businesses: CatalogReport,
    /// Review corpus counters.
    pub reviews: CorpusReport,
}

impl LoadReport {
    /// Whether either source failed to open or was cut short.
    pub const fn has_source_errors(&self) -> bool {
        self.businesses.source_error.is_some() || self.reviews.source_error.is_some()
    }
}

/// The loaded catalog and corpus.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    catalog: Catalog,
    corpus: Corpus,
}

impl Dataset {
    /// Load both files: the catalog first, then the reviews against it.
    ///
    /// Never fails; missing or unreadable files produce empty collections
    /// and are described in the returned report.
    #[tracing::instrument]
    pub fn load(paths: &DataPaths) -> (Self, LoadReport) {
        let (catalog, businesses) = Catalog::load(&paths.business_file);
        let (dataset, reviews) = Self::with_review_file(catalog, &paths.review_file);
        (
            dataset,
            LoadReport {
                businesses,
                reviews,
            },
        )
    }

    /// Second phase: load reviews from `path` against a finished catalog.
    pub fn with_review_file(catalog: Catalog, path: &Utf8Path) -> (Self, CorpusReport) {
        let (corpus, report) = Corpus::load(path, &catalog);
        (Self { catalog, corpus }, report)
    }

    /// Build a dataset from in-memory readers.
    pub fn from_readers<B: BufRead, R: BufRead>(businesses: B, reviews: R) -> (Self, LoadReport) {
        let (catalog, business_report) = Catalog::from_reader(businesses);
        let (corpus, review_report) = Corpus::from_reader(reviews, &catalog);
        (
            Self { catalog, corpus },
            LoadReport {
                businesses: business_report,
                reviews: review_report,
            },
        )
    }

    /// The business catalog.
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The review corpus.
    pub const fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Rank businesses for a dish. See [`recommend::recommend`].
    pub fn recommend(&self, query: &RecommendQuery<'_>) -> QueryResult<Vec<Recommendation>> {
        recommend::recommend(&self.catalog, &self.corpus, query)
    }
}
