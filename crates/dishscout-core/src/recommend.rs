//! Dish recommendation aggregation.
//!
//! Scans every review for literal, non-overlapping occurrences of a dish
//! phrase and ranks businesses by weighted score: the sum over matching
//! reviews of `mentions × stars`.
//!
//! The phrase is matched as given. Review text was lowercased at load time,
//! so callers must lowercase the phrase themselves; a mixed-case phrase
//! silently matches nothing.
//!
//! Equal scores are ordered by business identifier, ascending.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::corpus::Corpus;
use crate::error::{QueryError, QueryResult};

/// Thresholds and limits for one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendQuery<'a> {
    /// Lowercased dish phrase; must not be empty.
    pub dish: &'a str,
    /// Minimum total mentions across a business's reviews.
    pub min_mentions: u32,
    /// Minimum number of reviews mentioning the dish at least once.
    pub min_reviews: u32,
    /// Maximum number of results returned.
    pub max_results: usize,
}

/// One ranked business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    /// Business identifier.
    pub business_id: String,
    /// Display name.
    pub name: String,
    /// Sum of `mentions × stars` over matching reviews.
    pub score: f64,
    /// Total mentions across all reviews.
    pub mentions: u64,
    /// Reviews with at least one mention.
    pub reviews: u64,
    /// Composed street address.
    pub address: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Per-business accumulator, local to one call.
#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    score: f64,
    mentions: u64,
    reviews: u64,
}

/// Rank businesses in `catalog` by how their reviews in `corpus` mention
/// `query.dish`.
///
/// # Errors
///
/// Returns [`QueryError::EmptyDish`] if the dish phrase is empty; no scan is
/// performed. An empty result is not an error.
#[tracing::instrument(skip(catalog, corpus), fields(corpus_len = corpus.len()))]
pub fn recommend(
    catalog: &Catalog,
    corpus: &Corpus,
    query: &RecommendQuery<'_>,
) -> QueryResult<Vec<Recommendation>> {
    if query.dish.is_empty() {
        return Err(QueryError::EmptyDish);
    }

    let buckets = scan(corpus, query.dish);
    let matched = buckets.len();

    let mut ranked: Vec<(&str, Bucket)> = buckets
        .into_iter()
        .filter(|(_, b)| {
            b.mentions >= u64::from(query.min_mentions) && b.reviews >= u64::from(query.min_reviews)
        })
        .collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| b.score.total_cmp(&a.score).then_with(|| a_id.cmp(b_id)));
    ranked.truncate(query.max_results);

    let results: Vec<Recommendation> = ranked
        .into_iter()
        .filter_map(|(business_id, bucket)| {
            let Some(info) = catalog.get(business_id) else {
                tracing::warn!(business_id, "matched business missing from catalog");
                return None;
            };
            Some(Recommendation {
                business_id: business_id.to_string(),
                name: info.name.clone(),
                score: bucket.score,
                mentions: bucket.mentions,
                reviews: bucket.reviews,
                address: info.address.clone(),
                latitude: info.latitude,
                longitude: info.longitude,
            })
        })
        .collect();

    tracing::debug!(matched, returned = results.len(), "recommendation scan complete");
    Ok(results)
}

/// Accumulate mention statistics for every business with a matching review.
fn scan<'c>(corpus: &'c Corpus, dish: &str) -> HashMap<&'c str, Bucket> {
    let mut buckets: HashMap<&str, Bucket> = HashMap::new();
    for review in corpus {
        let mentions = count_mentions(review.text(), dish);
        if mentions == 0 {
            continue;
        }
        let bucket = buckets.entry(review.business_id()).or_default();
        bucket.score += mentions as f64 * review.stars();
        bucket.mentions += mentions;
        bucket.reviews += 1;
    }
    buckets
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
pub fn count_mentions(haystack: &str, needle: &str) -> u64 {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u64
}
