//! `DispatchEngine` — the shared matching algorithm and its atomic commit.

use std::sync::Arc;

use gd_core::{IncidentId, ResponderId, Tick};
use gd_incident::{IncidentStatus, IncidentStore};
use gd_registry::ResponderRegistry;
use gd_zone::{ZoneKey, lock};

use crate::candidate::{AssignmentAttempt, nearest_candidate};
use crate::{DispatchError, DispatchResult};

/// Result of one dispatch attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// Both records committed: incident `ASSIGNED`, unit `ENGAGED`.
    Assigned(AssignmentAttempt),
    /// No available unit of the right department in the zone.  Retried by
    /// the next sweep.
    NoCandidate,
    /// A precondition changed between selection and commit.  Nothing was
    /// written; the incident stays eligible.
    RaceLost,
    /// The incident had already left `RAISED` before selection.
    NotRaised(IncidentStatus),
}

impl DispatchOutcome {
    #[inline]
    pub fn is_assigned(&self) -> bool {
        matches!(self, DispatchOutcome::Assigned(_))
    }
}

/// Tally of one sweep pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepReport {
    pub zones:        usize,
    pub attempted:    usize,
    pub assigned:     Vec<AssignmentAttempt>,
    pub no_candidate: usize,
    pub race_lost:    usize,
    /// Incidents left alone because a manual window is still open.
    pub deferred:     usize,
    pub errors:       usize,
}

impl SweepReport {
    fn record(&mut self, outcome: DispatchOutcome) {
        self.attempted += 1;
        match outcome {
            DispatchOutcome::Assigned(a) => self.assigned.push(a),
            DispatchOutcome::NoCandidate => self.no_candidate += 1,
            DispatchOutcome::RaceLost | DispatchOutcome::NotRaised(_) => self.race_lost += 1,
        }
    }

    fn merge(mut self, other: SweepReport) -> SweepReport {
        self.zones += other.zones;
        self.attempted += other.attempted;
        self.assigned.extend(other.assigned);
        self.no_candidate += other.no_candidate;
        self.race_lost += other.race_lost;
        self.deferred += other.deferred;
        self.errors += other.errors;
        self
    }
}

pub struct DispatchEngine {
    registry:  Arc<ResponderRegistry>,
    incidents: Arc<IncidentStore>,
}

impl DispatchEngine {
    pub fn new(registry: Arc<ResponderRegistry>, incidents: Arc<IncidentStore>) -> Self {
        Self { registry, incidents }
    }

    pub fn registry(&self) -> &Arc<ResponderRegistry> {
        &self.registry
    }

    pub fn incidents(&self) -> &Arc<IncidentStore> {
        &self.incidents
    }

    /// Select the nearest available unit for `id` and try to commit.
    pub fn try_dispatch(&self, id: IncidentId, now: Tick) -> DispatchResult<DispatchOutcome> {
        let incident = self.incidents.get(id).ok_or(DispatchError::IncidentNotFound(id))?;
        if incident.status() != IncidentStatus::Raised {
            return Ok(DispatchOutcome::NotRaised(incident.status()));
        }

        let units = self.registry.available_in(&incident.zone, incident.department);
        let Some(attempt) = nearest_candidate(&incident, &units) else {
            log::debug!("{id}: no available {} unit in {}", incident.department, incident.zone);
            return Ok(DispatchOutcome::NoCandidate);
        };
        self.commit(attempt, now)
    }

    /// Assign a specific unit chosen by a human.
    ///
    /// The unit must be in the incident's zone and department.  Returns
    /// `RaceLost` if either side changed before commit.
    pub fn manual_assign(
        &self,
        incident:  IncidentId,
        responder: ResponderId,
        now:       Tick,
    ) -> DispatchResult<DispatchOutcome> {
        let inc = self.incidents.get(incident).ok_or(DispatchError::IncidentNotFound(incident))?;
        let unit = self.registry.get(responder).ok_or(DispatchError::ResponderNotFound(responder))?;

        if unit.zone != inc.zone {
            return Err(DispatchError::ZoneMismatch {
                incident,
                incident_zone:  inc.zone,
                responder,
                responder_zone: unit.zone,
            });
        }
        if unit.department != inc.department {
            return Err(DispatchError::DepartmentMismatch {
                incident,
                incident_dept:  inc.department,
                responder,
                responder_dept: unit.department,
            });
        }

        let attempt = AssignmentAttempt {
            incident,
            responder,
            responder_name: unit.name.clone(),
            distance_m:     inc.position.distance_m(unit.position),
        };
        self.commit(attempt, now)
    }

    /// Write `attempt` to both stores as one conditional update.
    ///
    /// Locks the incident, then the unit, and re-checks under both locks that
    /// the incident is still `RAISED` and the unit is still present,
    /// available, and in the incident's zone and department.  Either both
    /// records change or neither does.
    pub fn commit(&self, attempt: AssignmentAttempt, now: Tick) -> DispatchResult<DispatchOutcome> {
        let (Some(inc_h), Some(unit_h)) =
            (self.incidents.handle(attempt.incident), self.registry.handle(attempt.responder))
        else {
            log::debug!("{} / {}: record vanished before commit", attempt.incident, attempt.responder);
            return Ok(DispatchOutcome::RaceLost);
        };

        let mut inc = lock(&inc_h);
        let mut unit = lock(&unit_h);

        let eligible = inc.status() == IncidentStatus::Raised
            && unit.is_available()
            && unit.zone == inc.zone
            && unit.department == inc.department;
        if !eligible {
            log::debug!("{}: lost race for {}", attempt.incident, attempt.responder);
            return Ok(DispatchOutcome::RaceLost);
        }

        unit.engage(inc.id)?;
        if let Err(e) = inc.assign(unit.id, &unit.name, now) {
            // Status was checked under this same guard; undo the engage if
            // assign still refuses.
            unit.release(inc.id)?;
            return Err(e.into());
        }
        drop(unit);
        drop(inc);

        log::info!(
            "{} assigned to {} ({:.0} m)",
            attempt.incident, attempt.responder, attempt.distance_m
        );
        Ok(DispatchOutcome::Assigned(attempt))
    }

    /// One pass over every `RAISED` incident, zone by zone.
    ///
    /// Within a zone incidents are tried in severity, age, id order.
    /// Incidents for which `defer` returns `true` are left alone.
    pub fn sweep<F>(&self, now: Tick, defer: F) -> SweepReport
    where
        F: Fn(IncidentId) -> bool + Sync,
    {
        let zones = self.incidents.zones();

        #[cfg(not(feature = "parallel"))]
        let report = zones
            .iter()
            .map(|zone| self.sweep_zone(zone, now, &defer))
            .fold(SweepReport::default(), SweepReport::merge);

        #[cfg(feature = "parallel")]
        let report = {
            use rayon::prelude::*;

            zones
                .par_iter()
                .map(|zone| self.sweep_zone(zone, now, &defer))
                .reduce(SweepReport::default, SweepReport::merge)
        };

        log::debug!(
            "sweep at {now}: {} attempted, {} assigned, {} without candidate",
            report.attempted,
            report.assigned.len(),
            report.no_candidate
        );
        report
    }

    fn sweep_zone<F>(&self, zone: &ZoneKey, now: Tick, defer: &F) -> SweepReport
    where
        F: Fn(IncidentId) -> bool,
    {
        let mut report = SweepReport { zones: 1, ..SweepReport::default() };
        for incident in self.incidents.raised_in(zone) {
            if defer(incident.id) {
                report.deferred += 1;
                continue;
            }
            match self.try_dispatch(incident.id, now) {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    log::warn!("sweep: {} failed: {e}", incident.id);
                    report.errors += 1;
                }
            }
        }
        report
    }
}
