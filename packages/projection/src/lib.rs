#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate reference system helpers for Urban API geometries.
//!
//! The Urban API serves geometries as `GeoJSON` in geographic WGS 84. Area
//! and length calculations downstream need a metric CRS, so this crate
//! estimates the UTM zone covering a geometry (the centre of its bounding
//! box picks the zone and hemisphere) and projects every coordinate into it.

pub mod utm;

use geo::{BoundingRect, CoordsIter, MapCoords};
use thiserror::Error;
use urbanomy_gateway_models::Crs;

use crate::utm::TransverseMercator;

/// Errors from geometry parsing and reprojection.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The JSON value is not a valid `GeoJSON` geometry.
    #[error("Invalid GeoJSON geometry: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The geometry has no coordinates to derive a CRS from.
    #[error("Geometry is empty")]
    EmptyGeometry,

    /// A coordinate is not a valid longitude/latitude pair.
    #[error("Coordinate ({x}, {y}) is not a valid longitude/latitude")]
    InvalidCoordinate {
        /// Longitude.
        x: f64,
        /// Latitude.
        y: f64,
    },

    /// The target CRS is not one this crate can project into.
    #[error("Unsupported target CRS {crs}")]
    UnsupportedCrs {
        /// The requested CRS.
        crs: Crs,
    },
}

/// Parses a `GeoJSON` geometry object into a [`geo::Geometry`].
///
/// # Errors
///
/// Returns [`ProjectionError::GeoJson`] if the value is not a `GeoJSON`
/// geometry or cannot be converted.
pub fn parse_geometry(value: &serde_json::Value) -> Result<geo::Geometry<f64>, ProjectionError> {
    let geometry = geojson::Geometry::from_json_value(value.clone())?;
    Ok(geo::Geometry::try_from(geometry)?)
}

/// Estimates the UTM CRS best suited to a geographic geometry.
///
/// # Errors
///
/// Returns [`ProjectionError::EmptyGeometry`] if the geometry has no
/// coordinates, or [`ProjectionError::InvalidCoordinate`] if its bounding
/// box centre is not a valid longitude/latitude.
pub fn estimate_utm_crs(geometry: &geo::Geometry<f64>) -> Result<Crs, ProjectionError> {
    let rect = geometry
        .bounding_rect()
        .ok_or(ProjectionError::EmptyGeometry)?;
    let center = rect.center();
    validate_lon_lat(center.x, center.y)?;

    let zone = utm::zone_for_longitude(center.x);
    let crs = Crs::utm(zone, center.y >= 0.0);
    log::debug!(
        "Estimated {crs} for geometry centred at ({:.5}, {:.5})",
        center.x,
        center.y
    );
    Ok(crs)
}

/// Projects a geographic (EPSG:4326) geometry into the given UTM CRS.
///
/// # Errors
///
/// Returns [`ProjectionError::UnsupportedCrs`] if `target` is not a
/// WGS 84 / UTM system, or [`ProjectionError::InvalidCoordinate`] if any
/// input coordinate is outside the valid longitude/latitude range.
pub fn project(
    geometry: &geo::Geometry<f64>,
    target: Crs,
) -> Result<geo::Geometry<f64>, ProjectionError> {
    let (zone, north) = target
        .utm_zone()
        .ok_or(ProjectionError::UnsupportedCrs { crs: target })?;

    for coord in geometry.coords_iter() {
        validate_lon_lat(coord.x, coord.y)?;
    }

    let tm = TransverseMercator::utm(zone, north);
    Ok(geometry.map_coords(|coord| {
        let (x, y) = tm.forward(coord.x, coord.y);
        geo::Coord { x, y }
    }))
}

/// Projects a geographic geometry into its estimated UTM CRS.
///
/// # Errors
///
/// Propagates the errors of [`estimate_utm_crs`] and [`project`].
pub fn to_estimated_utm(
    geometry: &geo::Geometry<f64>,
) -> Result<(Crs, geo::Geometry<f64>), ProjectionError> {
    let crs = estimate_utm_crs(geometry)?;
    let projected = project(geometry, crs)?;
    Ok((crs, projected))
}

fn validate_lon_lat(x: f64, y: f64) -> Result<(), ProjectionError> {
    if x.is_finite() && y.is_finite() && (-180.0..=180.0).contains(&x) && (-90.0..=90.0).contains(&y)
    {
        Ok(())
    } else {
        Err(ProjectionError::InvalidCoordinate { x, y })
    }
}
