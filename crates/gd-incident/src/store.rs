//! `IncidentStore` — zone rosters of live incidents.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use gd_core::{Coordinate, Department, IncidentId, Tick, UserId};
use gd_zone::{Precision, ZoneKey, ZoneTable, encode, lock, neighbors};

use crate::incident::{Incident, NewIncident};
use crate::{IncidentError, IncidentResult, IncidentStatus};

/// How far around a new report to look for one already filed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DuplicateRule {
    /// `0.0` turns the check off.
    pub radius_m:       f64,
    /// Also scan the eight cells around the report's own.
    pub scan_neighbors: bool,
}

impl DuplicateRule {
    pub const OFF: DuplicateRule = DuplicateRule { radius_m: 0.0, scan_neighbors: false };
}

/// A live incident close to a new report.
#[derive(Clone, Debug, PartialEq)]
pub struct Duplicate {
    pub existing:   Incident,
    pub distance_m: f64,
}

/// Result of [`IncidentStore::raise_unique`].
#[derive(Clone, Debug, PartialEq)]
pub enum Filing {
    Filed(Incident),
    /// Nothing was filed; the reporter is pointed at the existing incident.
    Duplicate(Duplicate),
}

pub struct IncidentStore {
    precision:   Precision,
    incidents:   ZoneTable<IncidentId, Incident>,
    next_id:     AtomicU32,
    /// Active incidents per reporter.  Held across duplicate check and insert.
    by_reporter: Mutex<HashMap<UserId, BTreeSet<IncidentId>>>,
}

impl Default for IncidentStore {
    fn default() -> Self {
        Self::new(Precision::ROSTER)
    }
}

/// Sweep order: most severe first, then oldest, then lowest id.
fn sweep_order(a: &Incident, b: &Incident) -> std::cmp::Ordering {
    b.severity
        .cmp(&a.severity)
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}

impl IncidentStore {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            incidents:   ZoneTable::new(),
            next_id:     AtomicU32::new(0),
            by_reporter: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// File a new `RAISED` incident in the zone containing its position.
    pub fn raise(&self, new: NewIncident, now: Tick) -> IncidentResult<Incident> {
        let mut index = lock(&self.by_reporter);
        self.insert(&mut index, new, now)
    }

    /// File a new incident unless a live one of the same department already
    /// lies within `rule.radius_m`.  Check and insert are atomic with respect
    /// to other filings.
    pub fn raise_unique(&self, new: NewIncident, now: Tick, rule: DuplicateRule) -> IncidentResult<Filing> {
        let mut index = lock(&self.by_reporter);
        if let Some(dup) = self.find_duplicate(new.department, new.position, rule.radius_m, rule.scan_neighbors)? {
            log::info!(
                "{} report by {} duplicates {} ({:.1} m)",
                new.department, new.reporter, dup.existing.id, dup.distance_m
            );
            return Ok(Filing::Duplicate(dup));
        }
        Ok(Filing::Filed(self.insert(&mut index, new, now)?))
    }

    fn insert(
        &self,
        index: &mut HashMap<UserId, BTreeSet<IncidentId>>,
        new:   NewIncident,
        now:   Tick,
    ) -> IncidentResult<Incident> {
        let zone = encode(new.position, self.precision)?;
        let reporter = new.reporter;
        let id = IncidentId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let incident = Incident::new(id, zone.clone(), new, now);
        self.incidents.insert(zone.clone(), id, incident.clone());
        index.entry(reporter).or_default().insert(id);

        log::info!(
            "{id} raised in {zone} by {reporter} ({}, {})",
            incident.department, incident.severity
        );
        Ok(incident)
    }

    /// Nearest live incident of `department` within `radius_m` of
    /// `position`, searching its roster cell and optionally the eight around
    /// it.  Cancelled and archived records never count.
    pub fn find_duplicate(
        &self,
        department:     Department,
        position:       Coordinate,
        radius_m:       f64,
        scan_neighbors: bool,
    ) -> IncidentResult<Option<Duplicate>> {
        if !(radius_m > 0.0) {
            return Ok(None);
        }
        let mut zones = vec![encode(position, self.precision)?];
        if scan_neighbors {
            zones.extend(neighbors(&zones[0]));
        }

        let mut best: Option<Duplicate> = None;
        for zone in &zones {
            for (_, handle) in self.incidents.zone_snapshot(zone) {
                let inc = lock(&handle);
                if inc.department != department || inc.status().is_terminal() {
                    continue;
                }
                let d = position.distance_m(inc.position);
                if d <= radius_m && best.as_ref().map_or(true, |b| d < b.distance_m) {
                    best = Some(Duplicate { existing: inc.clone(), distance_m: d });
                }
            }
        }
        Ok(best)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn get(&self, id: IncidentId) -> Option<Incident> {
        self.incidents.get(&id).map(|h| lock(&h).clone())
    }

    /// Shared handle for conditional updates.
    pub fn handle(&self, id: IncidentId) -> Option<Arc<Mutex<Incident>>> {
        self.incidents.get(&id)
    }

    pub fn zone_of(&self, id: IncidentId) -> Option<ZoneKey> {
        self.incidents.zone_of(&id)
    }

    /// Every `RAISED` incident, in sweep order.
    pub fn raised(&self) -> Vec<Incident> {
        let mut out: Vec<Incident> = self
            .incidents
            .snapshot()
            .into_iter()
            .filter_map(|(_, _, h)| {
                let inc = lock(&h);
                (inc.status() == IncidentStatus::Raised).then(|| inc.clone())
            })
            .collect();
        out.sort_by(sweep_order);
        out
    }

    /// `RAISED` incidents in one zone, in sweep order.
    pub fn raised_in(&self, zone: &ZoneKey) -> Vec<Incident> {
        let mut out: Vec<Incident> = self
            .incidents
            .zone_snapshot(zone)
            .into_iter()
            .filter_map(|(_, h)| {
                let inc = lock(&h);
                (inc.status() == IncidentStatus::Raised).then(|| inc.clone())
            })
            .collect();
        out.sort_by(sweep_order);
        out
    }

    /// Zones that currently hold at least one incident.
    pub fn zones(&self) -> Vec<ZoneKey> {
        self.incidents.zones()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Every incident `reporter` has in the live store, lowest id first.
    pub fn active_for_reporter(&self, reporter: UserId) -> Vec<IncidentId> {
        lock(&self.by_reporter)
            .get(&reporter)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    // ── Conditional writes ────────────────────────────────────────────────

    /// Compare-and-swap on status.  Returns the record after the write.
    pub fn compare_and_transition(
        &self,
        id:       IncidentId,
        expected: IncidentStatus,
        next:     IncidentStatus,
        now:      Tick,
    ) -> IncidentResult<Incident> {
        let handle = self.incidents.get(&id).ok_or(IncidentError::NotFound(id))?;
        let mut inc = lock(&handle);
        if let Err(e) = inc.transition(expected, next, now) {
            log::warn!("rejected {expected} -> {next} on {id}: {e}");
            return Err(e);
        }
        log::debug!("{id}: {expected} -> {next}");
        Ok(inc.clone())
    }

    /// Idempotent `ASSIGNED → COMMUTING`.  `Ok(false)` if already commuting.
    pub fn start_commute(&self, id: IncidentId) -> IncidentResult<bool> {
        let handle = self.incidents.get(&id).ok_or(IncidentError::NotFound(id))?;
        let started = lock(&handle).start_commute()?;
        if started {
            log::info!("{id} commuting");
        }
        Ok(started)
    }

    /// Reporter rescinds a `RAISED` incident within `grace_ticks` of filing.
    ///
    /// The record stays in the store as `CANCELLED` until it is archived and
    /// removed.
    pub fn cancel(
        &self,
        id:          IncidentId,
        reporter:    UserId,
        now:         Tick,
        grace_ticks: u64,
    ) -> IncidentResult<Incident> {
        let handle = self.incidents.get(&id).ok_or(IncidentError::NotFound(id))?;
        let mut inc = lock(&handle);
        if inc.reporter != reporter {
            return Err(IncidentError::NotReporter { id, user: reporter });
        }
        if now.since(inc.created_at) > grace_ticks {
            return Err(IncidentError::GraceExpired(id));
        }
        inc.transition(IncidentStatus::Raised, IncidentStatus::Cancelled, now)?;
        log::info!("{id} cancelled by {reporter}");
        Ok(inc.clone())
    }

    /// Drop an `ARCHIVED` or `CANCELLED` record from the live store.
    ///
    /// Only call after the archive write has been acknowledged.
    pub fn remove_archived(&self, id: IncidentId) -> IncidentResult<Incident> {
        let mut status = None;
        let removed = self.incidents.remove_if(&id, |inc| {
            status = Some(inc.status());
            inc.status().is_terminal()
        });
        let Some(handle) = removed else {
            return match status {
                Some(status) => Err(IncidentError::NotTerminal { id, status }),
                None => Err(IncidentError::NotFound(id)),
            };
        };
        let inc = lock(&handle).clone();
        let mut index = lock(&self.by_reporter);
        if let Some(ids) = index.get_mut(&inc.reporter) {
            ids.remove(&id);
            if ids.is_empty() {
                index.remove(&inc.reporter);
            }
        }
        drop(index);
        log::debug!("{id} removed from live store");
        Ok(inc)
    }
}
