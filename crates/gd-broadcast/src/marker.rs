//! Threat marker records.

use gd_core::{Coordinate, IncidentId, Tick, UserId};
use gd_zone::ZoneKey;

/// An SOS victim's broadcast position.  One per owner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreatMarker {
    pub owner:      UserId,
    pub incident:   IncidentId,
    pub zone:       ZoneKey,
    pub position:   Coordinate,
    pub raised_at:  Tick,
    pub updated_at: Tick,
}

/// A marker as seen by one observer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NearbyThreat {
    pub owner:      UserId,
    pub incident:   IncidentId,
    pub position:   Coordinate,
    pub distance_m: f64,
}
