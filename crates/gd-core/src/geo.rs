//! Geographic coordinate type and the great-circle distance calculator.
//!
//! `Coordinate` uses `f64` latitude/longitude.  Arrival checks compare
//! distances against thresholds of a few tens of metres, so single precision
//! (≈1 m at the equator, worse after subtraction) is not enough here.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Mean Earth radius, metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A validated WGS-84 coordinate.
///
/// Construct with [`Coordinate::new`]; both fields are finite and in range
/// (`lat ∈ [-90, 90]`, `lng ∈ [-180, 180]`).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Validate and build a coordinate.
    pub fn new(lat: f64, lng: f64) -> CoreResult<Self> {
        if !lat.is_finite()
            || !lng.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(CoreError::InvalidCoordinate { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// `true` if both components are finite and in range.  Useful after
    /// deserializing, which bypasses [`Coordinate::new`].
    pub fn is_valid(&self) -> bool {
        Self::new(self.lat, self.lng).is_ok()
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Symmetric, and zero for identical coordinates.
    pub fn distance_m(self, other: Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng * 0.5).sin().powi(2);

        // Clamp guards against a > 1.0 from rounding near antipodes.
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_M * c
    }

    /// Approximate bounding-box check, much cheaper than `distance_m` for
    /// quick rejection before an exact radius test.
    #[inline]
    pub fn within_bbox(self, center: Coordinate, half_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= half_deg
            && (self.lng - center.lng).abs() <= half_deg
    }
}

/// Free-function form of [`Coordinate::distance_m`].
#[inline]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    a.distance_m(b)
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
