//! `ResponderRegistry` — zone rosters of field units.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gd_core::{Department, IncidentId, ResponderId, Tick};
use gd_zone::{Precision, ZoneKey, ZoneTable, encode, lock};

use crate::feed::{PositionFeed, PositionSubscription, PositionUpdate};
use crate::unit::{Heartbeat, ResponderUnit};
use crate::{RegistryError, RegistryResult};

/// Live roster of every connected unit, partitioned by zone.
///
/// Shared by reference between the dispatcher, the tracker, and the
/// resolution workflow; every method takes `&self`.
pub struct ResponderRegistry {
    precision: Precision,
    units:     ZoneTable<ResponderId, ResponderUnit>,
    feed:      Arc<PositionFeed>,
    /// Completed incidents per responder, oldest first.
    history:   Mutex<HashMap<ResponderId, Vec<IncidentId>>>,
}

impl Default for ResponderRegistry {
    fn default() -> Self {
        Self::new(Precision::ROSTER)
    }
}

impl ResponderRegistry {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            units:   ZoneTable::new(),
            feed:    Arc::new(PositionFeed::default()),
            history: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    // ── Presence ──────────────────────────────────────────────────────────

    /// Record a position report.
    ///
    /// Registers the unit as `AVAILABLE` on first sight; otherwise refreshes
    /// its position and `last_seen` and moves it between rosters if its zone
    /// changed.  Status and task are never touched here.  Returns the zone
    /// the unit now belongs to.
    pub fn heartbeat(&self, hb: Heartbeat, now: Tick) -> RegistryResult<ZoneKey> {
        let zone = encode(hb.position, self.precision)?;
        let id = hb.responder;
        let position = hb.position;

        // Expiry retires a record under its lock before unlinking it, so a
        // retired record seen here is on its way out and must not absorb
        // this heartbeat.
        let refreshed = self.units.get(&id).and_then(|handle| {
            let moved = {
                let mut unit = lock(&handle);
                if !unit.is_present() {
                    return None;
                }
                unit.position = position;
                unit.last_seen = now;
                unit.name = hb.name.clone();
                let moved = unit.zone != zone;
                unit.zone = zone.clone();
                moved
            };
            Some((handle, moved))
        });

        match refreshed {
            Some((handle, moved)) => {
                if moved {
                    self.units.relocate(&id, zone.clone());
                    // A concurrent heartbeat may have relocated in between;
                    // the record's own zone is authoritative.
                    let settled = lock(&handle).zone.clone();
                    if self.units.zone_of(&id).as_ref() != Some(&settled) {
                        self.units.relocate(&id, settled);
                    }
                    log::debug!("{id} moved to zone {zone}");
                }
            }
            None => {
                let unit = ResponderUnit::new(hb, zone.clone(), now);
                log::info!("{id} registered in zone {zone} ({})", unit.department);
                self.units.insert(zone.clone(), id, unit);
            }
        }

        self.feed.publish(&PositionUpdate { responder: id, position, zone: zone.clone(), tick: now });
        Ok(zone)
    }

    /// Remove units whose last heartbeat is more than `ttl_ticks` old.
    ///
    /// Only `AVAILABLE` units expire; an engaged unit keeps its assignment
    /// until its incident is resolved.  Returns the removed ids.
    pub fn expire_stale(&self, now: Tick, ttl_ticks: u64) -> Vec<ResponderId> {
        let mut expired = Vec::new();
        for (_, id, handle) in self.units.snapshot() {
            let stale = {
                let unit = lock(&handle);
                unit.is_available() && now.since(unit.last_seen) > ttl_ticks
            };
            if !stale {
                continue;
            }
            let removed = self.units.remove_if(&id, |unit| {
                let still_stale = unit.is_available() && now.since(unit.last_seen) > ttl_ticks;
                if still_stale {
                    unit.retire();
                }
                still_stale
            });
            if removed.is_some() {
                log::info!("{id} presence expired at {now}");
                expired.push(id);
            }
        }
        expired
    }

    /// Explicit sign-off.  An engaged unit cannot disconnect; `Ok(false)`.
    pub fn disconnect(&self, id: ResponderId) -> RegistryResult<bool> {
        if !self.units.contains(&id) {
            return Err(RegistryError::NotFound(id));
        }
        let removed = self.units.remove_if(&id, |unit| {
            let free = unit.is_available();
            if free {
                unit.retire();
            }
            free
        });
        if removed.is_some() {
            log::info!("{id} disconnected");
        } else {
            log::warn!("{id} tried to disconnect while engaged");
        }
        Ok(removed.is_some())
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Copy of a unit's current state.
    pub fn get(&self, id: ResponderId) -> Option<ResponderUnit> {
        self.units.get(&id).map(|h| lock(&h).clone())
    }

    /// Shared handle for conditional updates.
    ///
    /// Callers must not hold the guard while calling back into the registry.
    pub fn handle(&self, id: ResponderId) -> Option<Arc<Mutex<ResponderUnit>>> {
        self.units.get(&id)
    }

    pub fn zone_of(&self, id: ResponderId) -> Option<ZoneKey> {
        self.units.zone_of(&id)
    }

    /// Every unit in `zone`, ascending by id.
    pub fn roster(&self, zone: &ZoneKey) -> Vec<ResponderUnit> {
        self.units.zone_snapshot(zone).into_iter().map(|(_, h)| lock(&h).clone()).collect()
    }

    /// Available units of `department` in `zone`, ascending by id.
    ///
    /// A point-in-time view: any unit may be engaged by someone else before
    /// the caller commits.
    pub fn available_in(&self, zone: &ZoneKey, department: Department) -> Vec<ResponderUnit> {
        self.units
            .zone_snapshot(zone)
            .into_iter()
            .filter_map(|(_, h)| {
                let unit = lock(&h);
                (unit.is_available() && unit.department == department).then(|| unit.clone())
            })
            .collect()
    }

    pub fn zones(&self) -> Vec<ZoneKey> {
        self.units.zones()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// `ENGAGED → AVAILABLE` for the unit holding `task`.
    pub fn release(&self, id: ResponderId, task: IncidentId) -> RegistryResult<()> {
        let handle = self.units.get(&id).ok_or(RegistryError::NotFound(id))?;
        let result = lock(&handle).release(task);
        if result.is_ok() {
            log::debug!("{id} released from {task}");
        }
        result
    }

    // ── History ───────────────────────────────────────────────────────────

    pub fn record_completion(&self, id: ResponderId, incident: IncidentId) {
        lock(&self.history).entry(id).or_default().push(incident);
    }

    /// Incidents this unit has seen through to archive, oldest first.
    pub fn history(&self, id: ResponderId) -> Vec<IncidentId> {
        lock(&self.history).get(&id).cloned().unwrap_or_default()
    }

    // ── Position feed ─────────────────────────────────────────────────────

    /// Stream of `id`'s future heartbeats.  Dropping the handle unsubscribes.
    pub fn subscribe(&self, id: ResponderId) -> PositionSubscription {
        self.feed.subscribe(id)
    }

    pub fn subscriber_count(&self, id: ResponderId) -> usize {
        self.feed.subscriber_count(id)
    }
}
