#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Urban API gateway data types.
//!
//! These types describe what the gateway hands back to the planning
//! application: the functional zone source records of a scenario, the
//! normalized functional zone polygons, the projected project territory,
//! and opaque indicator values. Collections carry the coordinate reference
//! system their geometries are expressed in.

use geo::Area;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A JSON object, as used for feature properties.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Provenance labels the Urban API uses for functional zone datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum KnownSource {
    /// Zoning derived from `OpenStreetMap` land use.
    #[serde(rename = "OSM")]
    #[strum(serialize = "OSM")]
    Osm,
    /// Official land use and development rules (PZZ).
    #[serde(rename = "PZZ")]
    #[strum(serialize = "PZZ")]
    Pzz,
    /// Zoning uploaded by a user for the scenario.
    #[serde(rename = "User")]
    #[strum(serialize = "User")]
    User,
}

impl KnownSource {
    /// All known sources, most preferred first.
    pub const PRIORITY: [Self; 3] = [Self::Osm, Self::Pzz, Self::User];
}

/// One available functional zone dataset for a scenario.
///
/// Fields other than `source` and `year` are kept verbatim so they can be
/// handed back to callers unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Provenance label (e.g. `"OSM"`, `"PZZ"`, `"User"`).
    pub source: String,
    /// Dataset year.
    pub year: i32,
    /// Any other fields returned by the Urban API.
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl SourceDescriptor {
    /// Creates a descriptor with no extra fields.
    #[must_use]
    pub fn new(source: impl Into<String>, year: i32) -> Self {
        Self {
            source: source.into(),
            year,
            extra: JsonObject::new(),
        }
    }

    /// Returns the known source this descriptor refers to, if any.
    #[must_use]
    pub fn known_source(&self) -> Option<KnownSource> {
        self.source.parse().ok()
    }
}

/// A coordinate reference system identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    /// Geographic WGS 84 (longitude/latitude in degrees).
    pub const WGS84: Self = Self { epsg: 4326 };

    /// WGS 84 / UTM for the given zone and hemisphere.
    ///
    /// `zone` must be in `1..=60`.
    #[must_use]
    pub const fn utm(zone: u8, north: bool) -> Self {
        let base = if north { 32600 } else { 32700 };
        Self {
            epsg: base + zone as u32,
        }
    }

    /// The EPSG code.
    #[must_use]
    pub const fn epsg(self) -> u32 {
        self.epsg
    }

    /// Returns `(zone, north)` if this is a WGS 84 / UTM system.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn utm_zone(self) -> Option<(u8, bool)> {
        match self.epsg {
            32601..=32660 => Some(((self.epsg - 32600) as u8, true)),
            32701..=32760 => Some(((self.epsg - 32700) as u8, false)),
            _ => None,
        }
    }

    /// Name of the linear unit for projected systems.
    #[must_use]
    pub const fn linear_unit(self) -> Option<&'static str> {
        if self.utm_zone().is_some() {
            Some("metre")
        } else {
            None
        }
    }

    /// OGC URN form used in the GeoJSON `crs` member.
    #[must_use]
    pub fn urn(self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }

    fn geojson_member(self) -> JsonObject {
        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            serde_json::json!({
                "type": "name",
                "properties": { "name": self.urn() },
            }),
        );
        members
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// A classified land-use polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalZone {
    /// Land use zone label, `"Residential"` when the API has none.
    pub landuse_zone: String,
    /// Functional zone type identifier.
    pub zone_type_id: Option<i64>,
    /// Remaining non-bookkeeping properties.
    pub properties: JsonObject,
    /// Zone geometry.
    pub geometry: geo::Geometry<f64>,
}

impl FunctionalZone {
    /// Renders this zone as a GeoJSON feature.
    #[must_use]
    pub fn to_feature(&self) -> geojson::Feature {
        let mut properties = self.properties.clone();
        properties.insert(
            "landuse_zone".to_string(),
            serde_json::Value::String(self.landuse_zone.clone()),
        );
        properties.insert(
            "zone_type_id".to_string(),
            self.zone_type_id.map_or(serde_json::Value::Null, Into::into),
        );

        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Functional zones of a scenario from a single source.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalZones {
    /// The source dataset the zones were fetched from.
    pub source: SourceDescriptor,
    /// CRS of every zone geometry.
    pub crs: Crs,
    /// The zones.
    pub zones: Vec<FunctionalZone>,
}

impl FunctionalZones {
    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether there are no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Renders the zones as a GeoJSON feature collection with a `crs` member.
    #[must_use]
    pub fn to_feature_collection(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.zones.iter().map(FunctionalZone::to_feature).collect(),
            foreign_members: Some(self.crs.geojson_member()),
        }
    }
}

/// The spatial extent of a project, in a projected CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    /// Project the territory belongs to.
    pub project_id: i64,
    /// CRS of `geometry`.
    pub crs: Crs,
    /// Territory geometry.
    pub geometry: geo::Geometry<f64>,
}

impl Territory {
    /// Territory area in square metres.
    ///
    /// Returns `None` unless the CRS has metre units.
    #[must_use]
    pub fn area_sq_m(&self) -> Option<f64> {
        self.crs
            .linear_unit()
            .map(|_| self.geometry.unsigned_area())
    }

    /// Renders the territory as a single-feature GeoJSON collection.
    #[must_use]
    pub fn to_feature_collection(&self) -> geojson::FeatureCollection {
        let feature = geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(JsonObject::new()),
            foreign_members: None,
        };

        geojson::FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: Some(self.crs.geojson_member()),
        }
    }
}

/// Indicator values of a scenario, exactly as the Urban API returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorValues(pub serde_json::Value);

/// The parts of a scenario record the gateway resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    /// Scenario identifier.
    pub scenario_id: i64,
    /// Project the scenario belongs to.
    pub project_id: i64,
}
