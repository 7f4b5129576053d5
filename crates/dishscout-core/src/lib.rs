//! Core library for dishscout.
//!
//! Loads a restaurant business catalog and its reviews from newline-delimited
//! JSON, then ranks restaurants by how often (and how favourably) reviewers
//! mention a dish.
//!
//! # Modules
//!
//! - [`catalog`] - Business catalog loading (open, geo-tagged businesses)
//! - [`corpus`] - Review corpus loading, filtered by the catalog
//! - [`dataset`] - Two-phase initialization of catalog + corpus
//! - [`recommend`] - Mention counting, thresholds and ranking
//! - [`search`] - User-facing search requests, defaults and notices
//! - [`map`] - Map view model and GeoJSON export
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use dishscout_core::{Config, Dataset, SearchRequest, run_search};
//!
//! let config = Config::default();
//! let (dataset, _report) = Dataset::load(&config.data_paths());
//! let request = SearchRequest {
//!     dish: "Fish Tacos".to_string(),
//!     ..SearchRequest::default()
//! };
//! let outcome = run_search(&dataset, &request, &config.search_defaults()).unwrap();
//! for r in &outcome.recommendations {
//!     println!("{} {:.1}", r.name, r.score);
//! }
//! ```
#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod map;
mod ndjson;
pub mod recommend;
pub mod search;

pub use catalog::{BusinessRecord, Catalog, CatalogReport};
pub use config::{Config, ConfigLoader, LogLevel};
pub use corpus::{Corpus, CorpusReport, ReviewRecord};
pub use dataset::{DataPaths, Dataset, LoadReport};
pub use error::{ConfigError, ConfigResult, LoadError, MapError, QueryError, QueryResult};
pub use map::{MapMarker, MapView};
pub use recommend::{RecommendQuery, Recommendation, recommend};
pub use search::{
    MAX_DISPLAY_CEILING, Notice, NoticeKind, SearchDefaults, SearchOutcome, SearchRequest,
    ViewMode, run_search,
};
