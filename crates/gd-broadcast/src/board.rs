//! `ThreatBoard` — fine-zone table of active SOS markers.

use gd_core::{Coordinate, DispatchConfig, IncidentId, Tick, UserId};
use gd_zone::{Precision, ZoneKey, ZoneTable, encode, lock, neighbors};

use crate::marker::{NearbyThreat, ThreatMarker};
use crate::{BroadcastError, BroadcastResult};

/// Metres per degree of latitude.
const M_PER_DEG_LAT: f64 = 111_320.0;

pub struct ThreatBoard {
    precision: Precision,
    radius_m:  f64,
    neighbors: bool,
    markers:   ZoneTable<UserId, ThreatMarker>,
}

impl Default for ThreatBoard {
    fn default() -> Self {
        Self::new(Precision::THREAT, 200.0)
    }
}

impl ThreatBoard {
    pub fn new(precision: Precision, radius_m: f64) -> Self {
        Self { precision, radius_m, neighbors: false, markers: ZoneTable::new() }
    }

    pub fn from_config(config: &DispatchConfig) -> BroadcastResult<Self> {
        Ok(Self::new(Precision::new(config.threat_precision)?, config.threat_radius_m))
    }

    /// Also scan the eight buckets around the observer's.
    pub fn with_neighbors(mut self, on: bool) -> Self {
        self.neighbors = on;
        self
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    #[inline]
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Publish `owner`'s SOS at `position`, replacing any earlier marker of
    /// theirs.  Returns the bucket it landed in.
    pub fn activate(
        &self,
        owner:    UserId,
        incident: IncidentId,
        position: Coordinate,
        now:      Tick,
    ) -> BroadcastResult<ZoneKey> {
        let zone = encode(position, self.precision)?;
        let marker = ThreatMarker {
            owner,
            incident,
            zone: zone.clone(),
            position,
            raised_at: now,
            updated_at: now,
        };
        self.markers.insert(zone.clone(), owner, marker);
        log::info!("threat marker for {incident} raised by {owner} in {zone}");
        Ok(zone)
    }

    /// Move an existing marker as its owner moves.
    pub fn move_marker(&self, owner: UserId, position: Coordinate, now: Tick) -> BroadcastResult<ZoneKey> {
        let zone = encode(position, self.precision)?;
        let handle = self.markers.get(&owner).ok_or(BroadcastError::MarkerNotFound(owner))?;
        let moved = {
            let mut m = lock(&handle);
            m.position = position;
            m.updated_at = now;
            let moved = m.zone != zone;
            m.zone = zone.clone();
            moved
        };
        if moved {
            self.markers.relocate(&owner, zone.clone());
            let settled = lock(&handle).zone.clone();
            if self.markers.zone_of(&owner).as_ref() != Some(&settled) {
                self.markers.relocate(&owner, settled);
            }
            log::debug!("threat marker of {owner} moved to {zone}");
        }
        Ok(zone)
    }

    /// Remove `owner`'s marker.  `false` if there was none.
    pub fn clear(&self, owner: UserId) -> bool {
        self.markers.remove(&owner).is_some()
    }

    /// Remove every marker raised for `incident`.  Returns how many went.
    pub fn clear_incident(&self, incident: IncidentId) -> usize {
        self.retain(|m| m.incident != incident)
    }

    /// Keep only markers whose incident satisfies `active`; returns the
    /// number removed.
    pub fn retain_active<F>(&self, active: F) -> usize
    where
        F: Fn(IncidentId) -> bool,
    {
        self.retain(|m| active(m.incident))
    }

    fn retain<F>(&self, keep: F) -> usize
    where
        F: Fn(&ThreatMarker) -> bool,
    {
        let mut removed = 0;
        for (_, owner, handle) in self.markers.snapshot() {
            if keep(&*lock(&handle)) {
                continue;
            }
            if self.markers.remove_if(&owner, |m| !keep(&*m)).is_some() {
                log::debug!("threat marker of {owner} cleared");
                removed += 1;
            }
        }
        removed
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Markers within the threat radius of `position`, nearest first,
    /// excluding `observer`'s own.
    pub fn nearby(&self, observer: UserId, position: Coordinate) -> BroadcastResult<Vec<NearbyThreat>> {
        let zone = encode(position, self.precision)?;
        let mut zones = vec![zone];
        if self.neighbors {
            zones.extend(neighbors(&zones[0]));
        }

        // Longitude degrees are the shorter ones away from the equator, so
        // sizing the box by them covers the radius on both axes.
        let half_deg = self.radius_m / (M_PER_DEG_LAT * position.lat.to_radians().cos().max(0.01));
        let mut out = Vec::new();
        for z in &zones {
            for (owner, handle) in self.markers.zone_snapshot(z) {
                if owner == observer {
                    continue;
                }
                let m = lock(&handle).clone();
                if !m.position.within_bbox(position, half_deg) {
                    continue;
                }
                let distance_m = position.distance_m(m.position);
                if distance_m <= self.radius_m {
                    out.push(NearbyThreat { owner, incident: m.incident, position: m.position, distance_m });
                }
            }
        }
        out.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m).then(a.owner.cmp(&b.owner)));
        Ok(out)
    }

    pub fn get(&self, owner: UserId) -> Option<ThreatMarker> {
        self.markers.get(&owner).map(|h| lock(&h).clone())
    }

    /// Every marker in one bucket, ascending owner id.
    pub fn markers_in(&self, zone: &ZoneKey) -> Vec<ThreatMarker> {
        self.markers.zone_snapshot(zone).into_iter().map(|(_, h)| lock(&h).clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
