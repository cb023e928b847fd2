//! Route and ETA seam.  Display only; dispatch never consults it.

use gd_core::Coordinate;

use crate::{TrackingError, TrackingResult};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteEstimate {
    pub distance_m: f64,
    pub eta_secs:   u64,
}

/// An external mapping service.
pub trait DirectionsProvider: Send + Sync {
    fn route(&self, from: Coordinate, to: Coordinate) -> TrackingResult<RouteEstimate>;
}

/// Great-circle distance at a constant speed.
#[derive(Copy, Clone, Debug)]
pub struct StraightLineDirections {
    pub speed_mps: f64,
}

impl Default for StraightLineDirections {
    /// 30 km/h, a conservative urban average.
    fn default() -> Self {
        Self { speed_mps: 30_000.0 / 3_600.0 }
    }
}

impl DirectionsProvider for StraightLineDirections {
    fn route(&self, from: Coordinate, to: Coordinate) -> TrackingResult<RouteEstimate> {
        if !(self.speed_mps > 0.0) {
            return Err(TrackingError::Directions(format!("speed {} m/s", self.speed_mps)));
        }
        let distance_m = from.distance_m(to);
        Ok(RouteEstimate { distance_m, eta_secs: (distance_m / self.speed_mps).ceil() as u64 })
    }
}
