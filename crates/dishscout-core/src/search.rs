//! Search requests as a user submits them.
//!
//! Turns loosely-specified input (a dish as typed, optional thresholds, a
//! view mode) into an aggregator call and wraps the result with the
//! user-facing notices: limit clamping, empty results, map availability.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{QueryError, QueryResult};
use crate::map::MapView;
use crate::recommend::{RecommendQuery, Recommendation};

/// Hard ceiling on the number of results shown.
pub const MAX_DISPLAY_CEILING: usize = 500;

/// Default minimum mention count.
pub const DEFAULT_MIN_MENTIONS: u32 = 5;

/// Default minimum number of reviews mentioning the dish.
pub const DEFAULT_MIN_REVIEWS: u32 = 2;

/// Default number of results shown.
pub const DEFAULT_NUM_DISPLAY: usize = 10;

/// How results should be presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ViewMode {
    /// Ranked table.
    #[default]
    List,
    /// Ranked table plus map markers.
    Map,
}

/// Fallback values for parameters a request leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchDefaults {
    /// Minimum total mentions.
    pub min_mentions: u32,
    /// Minimum reviews mentioning the dish.
    pub min_reviews: u32,
    /// Results shown.
    pub num_display: usize,
    /// Ceiling applied to `num_display`.
    pub max_display: usize,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            min_mentions: DEFAULT_MIN_MENTIONS,
            min_reviews: DEFAULT_MIN_REVIEWS,
            num_display: DEFAULT_NUM_DISPLAY,
            max_display: MAX_DISPLAY_CEILING,
        }
    }
}

/// A dish search as submitted by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Dish name, any case. Surrounding whitespace is ignored.
    #[serde(default)]
    pub dish: String,
    /// Minimum total mentions across a restaurant's reviews.
    #[serde(default)]
    pub min_mentions: Option<u32>,
    /// Minimum number of reviews mentioning the dish.
    #[serde(default)]
    pub min_reviews: Option<u32>,
    /// Number of restaurants to show.
    #[serde(default)]
    pub num_display: Option<usize>,
    /// `list` or `map`.
    #[serde(default)]
    pub view: ViewMode,
}

/// Category of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The requested result count exceeded the ceiling and was clamped.
    LimitClamped,
    /// Nothing passed the filters.
    NoResults,
    /// A map was requested but could not be built.
    MapUnavailable,
}

/// A user-facing message that accompanies (but does not replace) results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notice {
    /// What happened.
    pub kind: NoticeKind,
    /// Text suitable for showing to the user.
    pub message: String,
}

/// Everything produced by one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchOutcome {
    /// Dish as entered (trimmed, original case), for labels.
    pub dish: String,
    /// Minimum mentions applied.
    pub min_mentions: u32,
    /// Minimum reviews applied.
    pub min_reviews: u32,
    /// Number of results requested before clamping.
    pub requested: usize,
    /// Number of results actually allowed.
    pub num_display: usize,
    /// Presentation mode.
    pub view: ViewMode,
    /// Ranked results.
    pub recommendations: Vec<Recommendation>,
    /// Soft errors and informational messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
    /// Map model, for `map` view with at least one result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapView>,
}

impl SearchOutcome {
    /// Find a notice of the given kind.
    pub fn notice(&self, kind: NoticeKind) -> Option<&Notice> {
        self.notices.iter().find(|n| n.kind == kind)
    }
}

/// Run a search against a loaded dataset.
///
/// # Errors
///
/// [`QueryError::EmptyDish`] when the dish is empty after trimming. Every
/// other condition (clamped limit, no results, no map) is reported as a
/// [`Notice`] on an otherwise valid outcome.
#[tracing::instrument(skip(dataset, request), fields(dish = %request.dish, view = ?request.view))]
pub fn run_search(
    dataset: &Dataset,
    request: &SearchRequest,
    defaults: &SearchDefaults,
) -> QueryResult<SearchOutcome> {
    let dish = request.dish.trim();
    if dish.is_empty() {
        return Err(QueryError::EmptyDish);
    }

    let min_mentions = request.min_mentions.unwrap_or(defaults.min_mentions);
    let min_reviews = request.min_reviews.unwrap_or(defaults.min_reviews);
    let requested = request.num_display.unwrap_or(defaults.num_display);

    let mut notices = Vec::new();
    let num_display = if requested > defaults.max_display {
        notices.push(Notice {
            kind: NoticeKind::LimitClamped,
            message: format!(
                "Requested number of restaurants ({requested}) exceeds the limit. Displaying a maximum of {}.",
                defaults.max_display
            ),
        });
        defaults.max_display
    } else {
        requested
    };

    let needle = dish.to_lowercase();
    let recommendations = dataset.recommend(&RecommendQuery {
        dish: &needle,
        min_mentions,
        min_reviews,
        max_results: num_display,
    })?;

    let mut map = None;
    if recommendations.is_empty() {
        notices.push(Notice {
            kind: NoticeKind::NoResults,
            message: format!(
                "No results found for '{}' with the given filters.",
                title_case(dish)
            ),
        });
    } else if request.view == ViewMode::Map {
        match MapView::from_recommendations(&recommendations) {
            Ok(view) => map = Some(view),
            Err(e) => {
                tracing::debug!(error = %e, "map view unavailable");
                notices.push(Notice {
                    kind: NoticeKind::MapUnavailable,
                    message: "Map view not available: Some restaurants are missing location data or no recommendations were found for map display.".to_string(),
                });
            }
        }
    }

    tracing::info!(
        results = recommendations.len(),
        notices = notices.len(),
        "search complete"
    );
    Ok(SearchOutcome {
        dish: dish.to_string(),
        min_mentions,
        min_reviews,
        requested,
        num_display,
        view: request.view,
        recommendations,
        notices,
        map,
    })
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
///
/// `"fish TACOS"` becomes `"Fish Tacos"`; `"mac'n'cheese"` becomes
/// `"Mac'N'Cheese"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let businesses = [
            r#"{"business_id":"tt","name":"Taco Town","address":"1 Main St","city":"Phoenix","state":"AZ","postal_code":"85004","latitude":33.45,"longitude":-112.07,"open":true}"#,
            r#"{"business_id":"pp","name":"Pho Palace","latitude":33.5,"longitude":-112.0,"open":true}"#,
        ]
        .join("\n");
        let reviews = [
            r#"{"business_id":"tt","stars":5,"text":"Great TACOS here, the tacos rock"}"#,
            r#"{"business_id":"tt","stars":3,"text":"tacos again"}"#,
            r#"{"business_id":"pp","stars":4,"text":"pho was hot"}"#,
        ]
        .join("\n");
        Dataset::from_readers(businesses.as_bytes(), reviews.as_bytes()).0
    }

    fn request(dish: &str) -> SearchRequest {
        SearchRequest {
            dish: dish.to_string(),
            min_mentions: Some(1),
            min_reviews: Some(1),
            ..SearchRequest::default()
        }
    }

    #[test]
    fn lowercases_dish_before_matching() {
        let outcome = run_search(&dataset(), &request("  Tacos "), &SearchDefaults::default()).unwrap();

        assert_eq!(outcome.dish, "Tacos");
        assert_eq!(outcome.recommendations.len(), 1);
        assert_eq!(outcome.recommendations[0].score, 13.0);
        assert!(outcome.notices.is_empty());
        assert!(outcome.map.is_none());
    }

    #[test]
    fn blank_dish_is_an_error() {
        let err = run_search(&dataset(), &request("   "), &SearchDefaults::default()).unwrap_err();
        assert_eq!(err, QueryError::EmptyDish);
        assert_eq!(err.to_string(), "Please enter a dish name to search for.");
    }

    #[test]
    fn defaults_fill_missing_parameters() {
        let req = SearchRequest {
            dish: "tacos".to_string(),
            ..SearchRequest::default()
        };
        let outcome = run_search(&dataset(), &req, &SearchDefaults::default()).unwrap();

        assert_eq!(outcome.min_mentions, DEFAULT_MIN_MENTIONS);
        assert_eq!(outcome.min_reviews, DEFAULT_MIN_REVIEWS);
        assert_eq!(outcome.num_display, DEFAULT_NUM_DISPLAY);
        // 3 mentions < 5
        assert!(outcome.recommendations.is_empty());
        assert_eq!(
            outcome.notice(NoticeKind::NoResults).unwrap().message,
            "No results found for 'Tacos' with the given filters."
        );
    }

    #[test]
    fn oversized_limit_is_clamped_with_notice() {
        let req = SearchRequest {
            num_display: Some(10_000),
            ..request("pho")
        };
        let outcome = run_search(&dataset(), &req, &SearchDefaults::default()).unwrap();

        assert_eq!(outcome.requested, 10_000);
        assert_eq!(outcome.num_display, MAX_DISPLAY_CEILING);
        assert!(outcome.recommendations.len() <= MAX_DISPLAY_CEILING);
        let notice = outcome.notice(NoticeKind::LimitClamped).unwrap();
        assert!(notice.message.contains("(10000)"));
        assert!(notice.message.contains("maximum of 500"));
        assert_eq!(outcome.recommendations.len(), 1);
    }

    #[test]
    fn configured_ceiling_is_respected() {
        let defaults = SearchDefaults {
            max_display: 1,
            ..SearchDefaults::default()
        };
        let req = SearchRequest {
            num_display: Some(2),
            ..request("a")
        };
        let outcome = run_search(&dataset(), &req, &defaults).unwrap();
        assert_eq!(outcome.recommendations.len(), 1);
        assert!(outcome.notice(NoticeKind::LimitClamped).is_some());
    }

    #[test]
    fn map_view_builds_markers() {
        let req = SearchRequest {
            view: ViewMode::Map,
            ..request("tacos")
        };
        let outcome = run_search(&dataset(), &req, &SearchDefaults::default()).unwrap();

        let map = outcome.map.expect("map should be built");
        assert_eq!(map.markers.len(), 1);
        assert_eq!(map.markers[0].tooltip, "1. Taco Town");
    }

    #[test]
    fn map_view_without_results_reports_no_results_only() {
        let req = SearchRequest {
            view: ViewMode::Map,
            ..request("sushi")
        };
        let outcome = run_search(&dataset(), &req, &SearchDefaults::default()).unwrap();

        assert!(outcome.map.is_none());
        assert!(outcome.notice(NoticeKind::NoResults).is_some());
        assert!(outcome.notice(NoticeKind::MapUnavailable).is_none());
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: SearchRequest = serde_json::from_str(r#"{"dish":"ramen"}"#).unwrap();
        assert_eq!(req.view, ViewMode::List);
        assert!(req.num_display.is_none());

        let req: SearchRequest = serde_json::from_str(r#"{"dish":"ramen","view":"map"}"#).unwrap();
        assert_eq!(req.view, ViewMode::Map);
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("fish TACOS"), "Fish Tacos");
        assert_eq!(title_case("mac'n'cheese"), "Mac'N'Cheese");
        assert_eq!(title_case("pad thai 2"), "Pad Thai 2");
    }
}
