//! Error types for dishscout-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading a dataset file.
///
/// Loaders never propagate these: they are recorded on the load report and
/// the loader yields whatever it managed to read (possibly nothing).
#[derive(Error, Debug)]
pub enum LoadError {
    /// The dataset file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Path that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Reading stopped partway through the input.
    #[error("read error after line {line}: {source}")]
    Read {
        /// Last line number read successfully.
        line: usize,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

/// Errors surfaced to the caller of a recommendation query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The dish phrase was empty (or whitespace only).
    #[error("Please enter a dish name to search for.")]
    EmptyDish,
}

/// Result type alias using [`QueryError`].
pub type QueryResult<T> = Result<T, QueryError>;

/// Reasons a map view cannot be produced for a result list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// There were no results to place on a map.
    #[error("no recommendations to place on the map")]
    NoResults,

    /// A result lacked usable coordinates.
    #[error("{name} has no usable location")]
    MissingLocation {
        /// Display name of the offending business.
        name: String,
    },
}
