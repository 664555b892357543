//! Normalizes Urban API functional zone features.
//!
//! A raw feature looks like:
//!
//! ```json
//! {
//!   "type": "Feature",
//!   "geometry": { "type": "Polygon", "coordinates": [...] },
//!   "properties": {
//!     "functional_zone_id": 1,
//!     "functional_zone_type": { "id": 14, "name": "unknown" },
//!     "properties": { "landuse_zon": "Industrial" },
//!     "year": 2024,
//!     "source": "OSM",
//!     ...
//!   }
//! }
//! ```
//!
//! and comes out as a [`FunctionalZone`] with `landuse_zone`,
//! `zone_type_id`, whatever non-bookkeeping properties remain, and the
//! parsed geometry.

use urbanomy_gateway_models::{FunctionalZone, JsonObject};

/// Properties that describe the API record rather than the zone.
pub const BOOKKEEPING_PROPERTIES: &[&str] = &[
    "properties",
    "functional_zone_type",
    "territory",
    "created_at",
    "updated_at",
    "zone_type_name",
    "functional_zone_id",
    "year",
    "source",
    "name",
];

/// Land use zone assigned when a feature has none.
pub const DEFAULT_LANDUSE_ZONE: &str = "Residential";

/// Zone type ids that are folded into another type (`from`, `to`).
const ZONE_TYPE_REMAP: &[(i64, i64)] = &[(14, 1)];

/// Returns the feature list of a response.
///
/// Accepts a `FeatureCollection` (uses its `features` member) or a bare
/// array of features. Anything else yields no features.
#[must_use]
pub fn extract_features(response: &serde_json::Value) -> &[serde_json::Value] {
    response
        .get("features")
        .unwrap_or(response)
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Normalizes a list of raw features.
///
/// Features without a usable geometry are skipped.
#[must_use]
pub fn normalize_features(features: &[serde_json::Value]) -> Vec<FunctionalZone> {
    features
        .iter()
        .enumerate()
        .filter_map(|(idx, feature)| {
            let zone = normalize_feature(feature);
            if zone.is_none() {
                log::warn!("Skipping functional zone feature {idx}: missing or invalid geometry");
            }
            zone
        })
        .collect()
}

/// Normalizes a single raw feature.
fn normalize_feature(feature: &serde_json::Value) -> Option<FunctionalZone> {
    let geometry = feature.get("geometry").filter(|g| !g.is_null())?;
    let geometry = urbanomy_projection::parse_geometry(geometry).ok()?;

    let empty = JsonObject::new();
    let props = feature
        .get("properties")
        .and_then(serde_json::Value::as_object)
        .unwrap_or(&empty);

    let landuse_zone = props
        .get("properties")
        .and_then(|inner| inner.get("landuse_zon"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or(DEFAULT_LANDUSE_ZONE)
        .to_string();

    let zone_type_id = props
        .get("functional_zone_type")
        .and_then(|t| t.get("id"))
        .and_then(serde_json::Value::as_i64)
        .map(remap_zone_type);

    let properties = props
        .iter()
        .filter(|(key, _)| !BOOKKEEPING_PROPERTIES.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(FunctionalZone {
        landuse_zone,
        zone_type_id,
        properties,
        geometry,
    })
}

fn remap_zone_type(id: i64) -> i64 {
    ZONE_TYPE_REMAP
        .iter()
        .find_map(|&(from, to)| (from == id).then_some(to))
        .unwrap_or(id)
}
