//! Map view model for a ranked result list.
//!
//! Produces everything a map renderer needs (center, bounds, one marker per
//! result) and can export it as GeoJSON. Drawing tiles is left to whatever
//! consumes the output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::MapError;
use crate::recommend::Recommendation;

/// A marker for one ranked business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MapMarker {
    /// 1-based rank in the result list.
    pub rank: usize,
    /// Business name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Short hover label, `"<rank>. <name>"`.
    pub tooltip: String,
    /// Multi-line popup body.
    pub popup: String,
}

/// Center, bounds and markers for a result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MapView {
    /// Mean `[latitude, longitude]` of all markers.
    pub center: [f64; 2],
    /// `[[min_lat, min_lon], [max_lat, max_lon]]`.
    pub bounds: [[f64; 2]; 2],
    /// One marker per result, in rank order.
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// Build a map view from ranked results.
    ///
    /// # Errors
    ///
    /// [`MapError::NoResults`] for an empty list, or
    /// [`MapError::MissingLocation`] if any result has a non-finite
    /// coordinate. No partial map is produced.
    pub fn from_recommendations(results: &[Recommendation]) -> Result<Self, MapError> {
        if results.is_empty() {
            return Err(MapError::NoResults);
        }
        if let Some(bad) = results
            .iter()
            .find(|r| !r.latitude.is_finite() || !r.longitude.is_finite())
        {
            return Err(MapError::MissingLocation {
                name: bad.name.clone(),
            });
        }

        let n = results.len() as f64;
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        let mut sum = [0.0; 2];
        for r in results {
            for (i, v) in [r.latitude, r.longitude].into_iter().enumerate() {
                min[i] = min[i].min(v);
                max[i] = max[i].max(v);
                sum[i] += v;
            }
        }

        let markers = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let rank = i + 1;
                MapMarker {
                    rank,
                    name: r.name.clone(),
                    latitude: r.latitude,
                    longitude: r.longitude,
                    tooltip: format!("{rank}. {}", r.name),
                    popup: format!(
                        "{rank}. {}\nScore: {:.2}\nMentions: {}\nReviews: {}\nAddress: {}",
                        r.name, r.score, r.mentions, r.reviews, r.address
                    ),
                }
            })
            .collect();

        Ok(Self {
            center: [sum[0] / n, sum[1] / n],
            bounds: [min, max],
            markers,
        })
    }

    /// Export as a GeoJSON `FeatureCollection` of points.
    ///
    /// Coordinates follow GeoJSON order (`[longitude, latitude]`); `bbox` is
    /// `[west, south, east, north]`.
    pub fn to_geojson(&self) -> serde_json::Value {
        let features: Vec<_> = self
            .markers
            .iter()
            .map(|m| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [m.longitude, m.latitude],
                    },
                    "properties": {
                        "rank": m.rank,
                        "name": m.name,
                        "tooltip": m.tooltip,
                        "popup": m.popup,
                    },
                })
            })
            .collect();

        let [[south, west], [north, east]] = self.bounds;
        json!({
            "type": "FeatureCollection",
            "bbox": [west, south, east, north],
            "features": features,
        })
    }
}
