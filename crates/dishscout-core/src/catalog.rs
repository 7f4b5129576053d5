//! Business catalog loading.
//!
//! Reads the business dataset (one JSON object per line) and keeps only
//! businesses that are open and geo-tagged. The resulting [`Catalog`] is
//! built once and never mutated afterwards; the review loader and the
//! recommendation aggregator only ever borrow it.
//!
//! Bad lines never abort a load. Unparseable JSON and records missing an
//! identifier or name are skipped with a warning naming the line, and the
//! counters in [`CatalogReport`] record what happened.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::Utf8Path;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LoadError;
use crate::ndjson;

/// A business that made it into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BusinessRecord {
    /// Unique business identifier.
    pub business_id: String,
    /// Display name.
    pub name: String,
    /// `"{street}, {city}, {state} {postal}"`, absent parts left empty.
    pub address: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Trimmed category names, in source order, empty segments included.
    pub categories: Vec<String>,
}

/// One line of the business dataset, every attribute optional.
///
/// Presence and type checks happen in [`RawBusiness::into_record`] rather
/// than being scattered across the loader.
#[derive(Debug, Deserialize)]
struct RawBusiness {
    business_id: Option<serde_json::Value>,
    name: Option<serde_json::Value>,
    address: Option<serde_json::Value>,
    city: Option<serde_json::Value>,
    state: Option<serde_json::Value>,
    postal_code: Option<serde_json::Value>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    categories: Option<serde_json::Value>,
    open: Option<serde_json::Value>,
}

/// Why a parsed business line did not produce a catalog entry.
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    MissingField(&'static str),
    Closed,
    NoLocation,
}

impl RawBusiness {
    fn into_record(self) -> Result<BusinessRecord, Rejection> {
        let Self {
            business_id,
            name,
            address,
            city,
            state,
            postal_code,
            latitude,
            longitude,
            categories,
            open,
        } = self;

        let Some(business_id) = business_id.and_then(scalar_text) else {
            return Err(Rejection::MissingField("business_id"));
        };
        let Some(name) = name.and_then(scalar_text) else {
            return Err(Rejection::MissingField("name"));
        };
        // Only a literal `true` counts; 1, "true" and friends do not.
        if !matches!(open, Some(serde_json::Value::Bool(true))) {
            return Err(Rejection::Closed);
        }
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Err(Rejection::NoLocation);
        };

        let categories = match categories {
            Some(serde_json::Value::String(raw)) => split_categories(&raw),
            _ => Vec::new(),
        };
        let [address, city, state, postal_code] =
            [address, city, state, postal_code].map(|part| part.and_then(scalar_text));
        let address = compose_address(
            address.as_deref(),
            city.as_deref(),
            state.as_deref(),
            postal_code.as_deref(),
        );

        Ok(BusinessRecord {
            business_id,
            name,
            address,
            latitude,
            longitude,
            categories,
        })
    }
}

/// Text form of a JSON field: strings as-is, other values through their
/// JSON rendering (`85281`, `true`), `null` as absent.
fn scalar_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Join address parts as `"{street}, {city}, {state} {postal}"`.
pub fn compose_address(
    street: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    postal_code: Option<&str>,
) -> String {
    format!(
        "{}, {}, {} {}",
        street.unwrap_or_default(),
        city.unwrap_or_default(),
        state.unwrap_or_default(),
        postal_code.unwrap_or_default(),
    )
}

/// Split a comma-separated category string into trimmed names.
///
/// Empty segments are kept: `"a,,b"` gives `["a", "", "b"]` and `""`
/// gives `[""]`.
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',').map(|c| c.trim().to_string()).collect()
}

/// Diagnostic counters from one catalog load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogReport {
    /// Source path, when loaded from a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Why the source could not be read (fully or partially).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    /// Lines consumed, blank lines included.
    pub lines: usize,
    /// Lines that parsed as a JSON object.
    pub parsed: usize,
    /// Lines skipped because they were not valid JSON.
    pub malformed: usize,
    /// Parsed records skipped for lacking an identifier or name.
    pub missing_fields: usize,
    /// Records flagged open.
    pub open: usize,
    /// Open records that also carried coordinates.
    pub geo_tagged: usize,
    /// Entries that replaced an earlier record with the same identifier.
    pub replaced: usize,
    /// Businesses in the finished catalog.
    pub loaded: usize,
}

/// Immutable mapping from business identifier to [`BusinessRecord`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    businesses: HashMap<String, BusinessRecord>,
}

impl Catalog {
    /// Build a catalog from newline-delimited business JSON.
    ///
    /// A later line with an identifier already seen replaces the earlier
    /// entry. A read failure partway through keeps everything loaded so far.
    #[tracing::instrument(skip(reader))]
    pub fn from_reader<R: BufRead>(reader: R) -> (Self, CatalogReport) {
        let mut businesses = HashMap::new();
        let mut report = CatalogReport::default();

        let scanned = ndjson::for_each_record(reader, |line, parsed: Result<RawBusiness, _>| {
            let raw = match parsed {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(line, error = %e, "skipping unparseable business line");
                    report.malformed += 1;
                    return;
                }
            };
            report.parsed += 1;

            match raw.into_record() {
                Ok(record) => {
                    report.open += 1;
                    report.geo_tagged += 1;
                    if businesses
                        .insert(record.business_id.clone(), record)
                        .is_some()
                    {
                        report.replaced += 1;
                    }
                }
                Err(Rejection::MissingField(field)) => {
                    warn!(line, field, "skipping business record with missing field");
                    report.missing_fields += 1;
                }
                Err(Rejection::NoLocation) => report.open += 1,
                Err(Rejection::Closed) => {}
            }
        });

        match scanned {
            Ok(lines) => report.lines = lines,
            Err(e) => {
                warn!(error = %e, "business data truncated");
                if let LoadError::Read { line, .. } = e {
                    report.lines = line;
                }
                report.source_error = Some(e.to_string());
            }
        }
        report.loaded = businesses.len();

        info!(
            lines = report.lines,
            parsed = report.parsed,
            open = report.open,
            geo_tagged = report.geo_tagged,
            loaded = report.loaded,
            malformed = report.malformed,
            "business catalog loaded"
        );
        (Self { businesses }, report)
    }

    /// Load the catalog from a file.
    ///
    /// A missing or unreadable file yields an empty catalog; the failure is
    /// logged and recorded in the report's `source_error`.
    #[tracing::instrument]
    pub fn load(path: &Utf8Path) -> (Self, CatalogReport) {
        let (catalog, mut report) = match File::open(path.as_std_path()) {
            Ok(file) => Self::from_reader(BufReader::new(file)),
            Err(source) => {
                let e = LoadError::Open {
                    path: path.to_path_buf(),
                    source,
                };
                warn!(error = %e, "business data unavailable; catalog is empty");
                let report = CatalogReport {
                    source_error: Some(e.to_string()),
                    ..CatalogReport::default()
                };
                (Self::default(), report)
            }
        };
        report.source = Some(path.to_string());
        (catalog, report)
    }

    /// Look up a business by identifier.
    pub fn get(&self, business_id: &str) -> Option<&BusinessRecord> {
        self.businesses.get(business_id)
    }

    /// Whether the identifier is present.
    pub fn contains(&self, business_id: &str) -> bool {
        self.businesses.contains_key(business_id)
    }

    /// Number of businesses.
    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    /// Whether the catalog holds no businesses.
    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    /// Iterate over all records in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &BusinessRecord> {
        self.businesses.values()
    }
}

impl FromIterator<BusinessRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = BusinessRecord>>(iter: I) -> Self {
        Self {
            businesses: iter
                .into_iter()
                .map(|b| (b.business_id.clone(), b))
                .collect(),
        }
    }
}
