//! The `Service` struct: client commands and the tick loop.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use gd_broadcast::{NearbyThreat, ThreatBoard};
use gd_core::{Clock, Coordinate, DispatchConfig, IncidentId, ResponderId, Tick, UserId};
use gd_dispatch::{DispatchOutcome, Dispatcher, TriggerOutcome};
use gd_incident::{DuplicateRule, Filing, Incident, IncidentStore, NewIncident};
use gd_registry::{Heartbeat, ResponderRegistry};
use gd_resolution::{ArchiveReceipt, CompletionProof, ResolutionError, ResolutionWorkflow};
use gd_tracking::{RouteEstimate, Tracker, TrackingSignal};
use gd_zone::{ZoneKey, lock};

use crate::observer::{ServiceObserver, TickSummary};
use crate::{ServiceError, ServiceResult};

/// A newly filed incident and what dispatch did with it.
#[derive(Clone, Debug)]
pub struct Raised {
    pub incident: Incident,
    pub dispatch: TriggerOutcome,
    /// Threat bucket, for emergency departments.
    pub threat:   Option<ZoneKey>,
}

/// The running engine.
///
/// Owns every component and drives the periodic tick loop:
///
/// 1. **Dispatch timers**: expired manual windows are dispatched
///    automatically, then the sweep runs if it is due.
/// 2. **Presence**: `AVAILABLE` units past the presence TTL are dropped.
/// 3. **Tracking**: position feeds are drained into the arrival detectors
///    and stale feeds raise lost-signal events.
/// 4. **Archive retry**: cancelled incidents whose archive write failed are
///    tried again.
/// 5. **Threat cleanup**: markers of finished incidents are removed.
///
/// Client commands take `&self` and run at the current tick; they may be
/// called from any thread between or during ticks.
///
/// Create via [`ServiceBuilder`][crate::ServiceBuilder].
pub struct Service {
    pub(crate) config:          DispatchConfig,
    pub(crate) clock:           Clock,
    pub(crate) registry:        Arc<ResponderRegistry>,
    pub(crate) incidents:       Arc<IncidentStore>,
    pub(crate) dispatcher:      Dispatcher,
    pub(crate) tracker:         Tracker,
    pub(crate) resolution:      ResolutionWorkflow,
    pub(crate) threats:         ThreatBoard,
    /// Cancelled incidents still waiting for a successful archive write.
    pub(crate) pending_archive: Mutex<BTreeSet<IncidentId>>,
}

impl Service {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ResponderRegistry> {
        &self.registry
    }

    pub fn incidents(&self) -> &Arc<IncidentStore> {
        &self.incidents
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn resolution(&self) -> &ResolutionWorkflow {
        &self.resolution
    }

    pub fn threats(&self) -> &ThreatBoard {
        &self.threats
    }

    // ── Reporter commands ─────────────────────────────────────────────────

    /// File an incident.  Emergency departments also raise a threat marker
    /// at the reporter's position and dispatch immediately; the rest open a
    /// manual-assignment window.
    ///
    /// A report close to a live incident of the same department is not
    /// filed; [`ServiceError::Duplicate`] names the existing one.
    pub fn raise(&self, new: NewIncident) -> ServiceResult<Raised> {
        let now = self.now();
        let rule = DuplicateRule {
            radius_m:       self.config.duplicate_radius_for(new.department),
            scan_neighbors: new.department.scans_neighbor_cells(),
        };
        let incident = match self.incidents.raise_unique(new, now, rule)? {
            Filing::Filed(incident) => incident,
            Filing::Duplicate(dup) => return Err(ServiceError::Duplicate(dup)),
        };
        let threat = if incident.department.is_emergency() {
            Some(self.threats.activate(incident.reporter, incident.id, incident.position, now)?)
        } else {
            None
        };
        let dispatch = self.dispatcher.on_raised(incident.id, now)?;
        Ok(Raised { incident, dispatch, threat })
    }

    /// Rescind a `RAISED` incident within the grace window, then archive and
    /// remove it.
    ///
    /// If the archive write fails the incident stays `CANCELLED` in the store
    /// and is retried every tick; the error is still returned.
    pub fn cancel(&self, incident: IncidentId, reporter: UserId) -> ServiceResult<ArchiveReceipt> {
        let now = self.now();
        self.incidents.cancel(incident, reporter, now, self.config.cancel_grace_ticks())?;
        self.dispatcher.forget(incident);
        self.threats.clear_incident(incident);
        match self.resolution.archive_cancelled(incident, now) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                lock(&self.pending_archive).insert(incident);
                Err(e.into())
            }
        }
    }

    /// Reporter accepts the resolution.  On success the incident is gone and
    /// its unit is `AVAILABLE` again.
    pub fn confirm(&self, incident: IncidentId, reporter: UserId) -> ServiceResult<ArchiveReceipt> {
        let receipt = self.resolution.confirm(incident, reporter, self.now())?;
        self.tracker.stop(incident);
        self.threats.clear_incident(incident);
        Ok(receipt)
    }

    /// Reporter disputes the resolution; the unit goes back to work.
    pub fn reject(&self, incident: IncidentId, reporter: UserId) -> ServiceResult<Incident> {
        Ok(self.resolution.reject(incident, reporter, self.now())?)
    }

    /// Update an SOS victim's marker position.
    pub fn move_threat(&self, owner: UserId, position: Coordinate) -> ServiceResult<ZoneKey> {
        Ok(self.threats.move_marker(owner, position, self.now())?)
    }

    /// Threats near an observer, nearest first.
    pub fn nearby_threats(&self, observer: UserId, position: Coordinate) -> ServiceResult<Vec<NearbyThreat>> {
        Ok(self.threats.nearby(observer, position)?)
    }

    // ── Responder commands ────────────────────────────────────────────────

    pub fn heartbeat(&self, hb: Heartbeat) -> ServiceResult<ZoneKey> {
        Ok(self.registry.heartbeat(hb, self.now())?)
    }

    pub fn disconnect(&self, responder: ResponderId) -> ServiceResult<bool> {
        Ok(self.registry.disconnect(responder)?)
    }

    /// `ASSIGNED → COMMUTING` and start tracking.  Idempotent: a second call
    /// changes nothing and returns no signals.
    pub fn start_navigation(
        &self,
        incident:  IncidentId,
        responder: ResponderId,
    ) -> ServiceResult<Vec<TrackingSignal>> {
        self.require_assignee(incident, responder)?;
        self.incidents.start_commute(incident)?;
        Ok(self.tracker.start(incident, self.now())?)
    }

    pub fn acknowledge_arrival(
        &self,
        incident:  IncidentId,
        responder: ResponderId,
    ) -> ServiceResult<Option<TrackingSignal>> {
        self.require_assignee(incident, responder)?;
        Ok(self.tracker.acknowledge(incident)?)
    }

    pub fn submit_completion(&self, incident: IncidentId, proof: CompletionProof) -> ServiceResult<Incident> {
        Ok(self.resolution.submit_completion(incident, proof, self.now())?)
    }

    pub fn route(&self, incident: IncidentId) -> ServiceResult<RouteEstimate> {
        Ok(self.tracker.route(incident)?)
    }

    pub fn distance_to_incident(&self, incident: IncidentId) -> ServiceResult<f64> {
        Ok(self.tracker.distance_to_incident(incident)?)
    }

    // ── Dispatcher commands ───────────────────────────────────────────────

    /// A human picks `responder` for `incident`.  Closes the manual window
    /// on success.
    pub fn manual_assign(&self, incident: IncidentId, responder: ResponderId) -> ServiceResult<DispatchOutcome> {
        Ok(self.dispatcher.manual_select(incident, responder, self.now())?)
    }

    fn require_assignee(&self, incident: IncidentId, responder: ResponderId) -> ServiceResult<()> {
        let inc = self
            .incidents
            .get(incident)
            .ok_or(gd_incident::IncidentError::NotFound(incident))?;
        if inc.assigned_to() != Some(responder) {
            return Err(ServiceError::NotAssignee { incident, responder });
        }
        Ok(())
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Run exactly `n` ticks from the current position.
    pub fn run_ticks<O: ServiceObserver>(&mut self, n: u64, observer: &mut O) -> ServiceResult<()> {
        for _ in 0..n {
            let now = self.now();
            observer.on_tick_start(now);
            let summary = self.process_tick(now, observer);
            observer.on_tick_end(now, &summary);
            self.clock.advance();
        }
        Ok(())
    }

    fn process_tick<O: ServiceObserver>(&self, now: Tick, observer: &mut O) -> TickSummary {
        let mut summary = TickSummary::default();

        // ── Dispatch timers ───────────────────────────────────────────────
        let report = self.dispatcher.tick(now);
        for (_, outcome) in &report.expired {
            if let DispatchOutcome::Assigned(attempt) = outcome {
                observer.on_assignment(now, attempt);
                summary.assigned += 1;
            }
        }
        if let Some(sweep) = &report.sweep {
            for attempt in &sweep.assigned {
                observer.on_assignment(now, attempt);
            }
            summary.assigned += sweep.assigned.len();
            observer.on_sweep(now, sweep);
        }

        // ── Presence ──────────────────────────────────────────────────────
        summary.expired_units = self.registry.expire_stale(now, self.config.presence_ttl_ticks());

        // ── Tracking ──────────────────────────────────────────────────────
        for signal in self.tracker.poll(now) {
            observer.on_signal(now, &signal);
            summary.signals += 1;
        }

        // ── Archive retry ─────────────────────────────────────────────────
        let pending: Vec<IncidentId> = lock(&self.pending_archive).iter().copied().collect();
        for id in pending {
            match self.resolution.archive_cancelled(id, now) {
                Ok(receipt) => {
                    lock(&self.pending_archive).remove(&id);
                    observer.on_archived(now, &receipt);
                }
                Err(ResolutionError::IncidentNotFound(_)) => {
                    lock(&self.pending_archive).remove(&id);
                }
                Err(e) => log::warn!("{id}: cancelled archive still failing: {e}"),
            }
        }

        // ── Threat cleanup ────────────────────────────────────────────────
        let incidents = &self.incidents;
        summary.markers_cleared = self
            .threats
            .retain_active(|id| incidents.get(id).is_some_and(|inc| inc.status().is_active()));

        summary
    }
}
