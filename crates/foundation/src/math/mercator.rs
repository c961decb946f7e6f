//! Spherical Web Mercator (EPSG:3857) conversion between geographic
//! coordinates and the projected plane the map engine draws in.

use serde::{Deserialize, Serialize};

use super::Vec2;

/// Sphere radius used by Web Mercator (WGS84 semi-major axis, meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which the projected world becomes square.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_78;

/// Half the projected world width (meters). Also the projected y limit.
pub const HALF_WORLD_M: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

/// Meters per pixel at zoom 0 with 256px tiles.
pub const MAX_RESOLUTION_M_PER_PX: f64 = 2.0 * HALF_WORLD_M / 256.0;

/// Slack for projected inputs that sit on the world edge after float rounding.
const WORLD_EDGE_EPS_M: f64 = 1e-6;

/// A position on the projected plane, in meters.
pub type ProjectedPoint = Vec2;

#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("invalid coordinate: lon={lon} lat={lat}")]
    InvalidCoordinate { lon: f64, lat: f64 },
    #[error("invalid projected coordinate: x={x} y={y}")]
    InvalidProjectedCoordinate { x: f64, y: f64 },
}

/// Geographic coordinate pair in degrees.
///
/// Construction is unchecked; range validation happens at projection time so a
/// single malformed input can be rejected without touching anything else.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    pub fn validate(self) -> Result<Self, GeoError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GeoError::InvalidCoordinate {
                lon: self.lon,
                lat: self.lat,
            })
        }
    }

    pub fn approx_eq(&self, other: &GeoPoint, eps_deg: f64) -> bool {
        (self.lon - other.lon).abs() <= eps_deg && (self.lat - other.lat).abs() <= eps_deg
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// Projects a geographic point onto the Web Mercator plane.
///
/// Latitudes beyond [`MERCATOR_MAX_LAT_DEG`] are clamped to the projection limit.
pub fn to_projected(p: GeoPoint) -> Result<ProjectedPoint, GeoError> {
    let p = p.validate()?;
    let lat = p
        .lat
        .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
        .to_radians();
    let x = EARTH_RADIUS_M * p.lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + 0.5 * lat).tan().ln();
    Ok(Vec2::new(x, y.clamp(-HALF_WORLD_M, HALF_WORLD_M)))
}

/// Inverse of [`to_projected`].
///
/// `x` values on a wrapped world copy are brought back into [-180, 180].
pub fn to_geo(p: ProjectedPoint) -> Result<GeoPoint, GeoError> {
    if !p.is_finite() || p.y.abs() > HALF_WORLD_M + WORLD_EDGE_EPS_M {
        return Err(GeoError::InvalidProjectedCoordinate { x: p.x, y: p.y });
    }
    let x = if p.x.abs() > HALF_WORLD_M + WORLD_EDGE_EPS_M {
        (p.x + HALF_WORLD_M).rem_euclid(2.0 * HALF_WORLD_M) - HALF_WORLD_M
    } else {
        p.x.clamp(-HALF_WORLD_M, HALF_WORLD_M)
    };
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (p.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    Ok(GeoPoint::new(lon, lat))
}

/// Meters per pixel at `zoom`.
pub fn resolution_for_zoom(zoom: f64) -> f64 {
    MAX_RESOLUTION_M_PER_PX / 2f64.powf(zoom)
}

/// Fractional zoom level with the given meters-per-pixel resolution.
pub fn zoom_for_resolution(resolution: f64) -> f64 {
    (MAX_RESOLUTION_M_PER_PX / resolution).log2()
}
