//! WGS 84 / UTM transverse Mercator forward projection.
//!
//! Series expansion from Snyder, "Map Projections: A Working Manual"
//! (USGS Professional Paper 1395, pp. 61-64). Accurate to well under a
//! millimetre inside a zone, degrading slowly towards the zone edges.

/// WGS 84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS 84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM central meridian scale factor.
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Width of a UTM zone in degrees of longitude.
pub const ZONE_WIDTH_DEG: f64 = 6.0;

/// Transverse Mercator parameters for one UTM zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    central_meridian: f64,
    false_northing: f64,
}

impl TransverseMercator {
    /// Parameters for UTM `zone` (`1..=60`) in the given hemisphere.
    #[must_use]
    pub fn utm(zone: u8, north: bool) -> Self {
        Self {
            central_meridian: central_meridian(zone),
            false_northing: if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH },
        }
    }

    /// Projects a longitude/latitude pair in degrees to easting/northing
    /// in metres.
    #[must_use]
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let phi = lat_deg.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * (lon_deg - self.central_meridian).to_radians();

        let m = WGS84_A
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let easting = UTM_K0
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
            + UTM_FALSE_EASTING;

        let northing = UTM_K0
            * (m + n
                * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0))
            + self.false_northing;

        (easting, northing)
    }
}

/// Central meridian of a UTM zone in degrees.
#[must_use]
pub fn central_meridian(zone: u8) -> f64 {
    f64::from(zone.saturating_sub(1)).mul_add(ZONE_WIDTH_DEG, -180.0) + ZONE_WIDTH_DEG / 2.0
}

/// UTM zone containing the given longitude.
///
/// A longitude exactly on a zone boundary belongs to the zone west of it
/// (6°E is zone 31). Longitudes outside `[-180, 180]` are clamped to the
/// first or last zone.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn zone_for_longitude(lon_deg: f64) -> u8 {
    let zone = ((lon_deg + 180.0) / ZONE_WIDTH_DEG).ceil();
    zone.clamp(1.0, 60.0) as u8
}
