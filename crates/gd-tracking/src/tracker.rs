//! `Tracker` — owns one subscription per commuting incident.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use gd_core::{Coordinate, DispatchConfig, IncidentId, ResponderId, Tick};
use gd_incident::{IncidentStatus, IncidentStore};
use gd_registry::{PositionSubscription, ResponderRegistry};
use gd_zone::lock;

use crate::detector::{ArrivalDetector, TrackingSignal};
use crate::directions::{DirectionsProvider, RouteEstimate, StraightLineDirections};
use crate::{TrackingError, TrackingResult};

/// Live tracking of one incident.  Dropping it releases the position feed.
pub struct TrackingSession {
    pub incident:      IncidentId,
    pub responder:     ResponderId,
    pub target:        Coordinate,
    pub last_position: Option<Coordinate>,
    detector:          ArrivalDetector,
    feed:              PositionSubscription,
}

impl TrackingSession {
    pub fn detector(&self) -> &ArrivalDetector {
        &self.detector
    }

    fn sample(&mut self, position: Coordinate, now: Tick) -> Vec<TrackingSignal> {
        self.last_position = Some(position);
        self.detector.observe(self.target.distance_m(position), now)
    }
}

#[derive(Copy, Clone, Debug)]
struct Thresholds {
    arrival_m:       f64,
    departure_m:     f64,
    staleness_ticks: u64,
}

pub struct Tracker {
    registry:   Arc<ResponderRegistry>,
    incidents:  Arc<IncidentStore>,
    directions: Arc<dyn DirectionsProvider>,
    thresholds: Thresholds,
    sessions:   Mutex<BTreeMap<IncidentId, TrackingSession>>,
}

impl Tracker {
    pub fn new(
        registry:  Arc<ResponderRegistry>,
        incidents: Arc<IncidentStore>,
        config:    &DispatchConfig,
    ) -> Self {
        Self {
            registry,
            incidents,
            directions: Arc::new(StraightLineDirections::default()),
            thresholds: Thresholds {
                arrival_m:       config.arrival_threshold_m,
                departure_m:     config.departure_threshold_m,
                staleness_ticks: config.staleness_ticks(),
            },
            sessions:   Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_directions(mut self, directions: Arc<dyn DirectionsProvider>) -> Self {
        self.directions = directions;
        self
    }

    /// Begin tracking a `COMMUTING` incident.
    ///
    /// The unit's last known position is fed in immediately, so a unit
    /// already on scene raises `Arrived` here.  Starting twice is a no-op.
    pub fn start(&self, incident: IncidentId, now: Tick) -> TrackingResult<Vec<TrackingSignal>> {
        let inc = self.incidents.get(incident).ok_or(TrackingError::IncidentNotFound(incident))?;
        if inc.status() != IncidentStatus::Commuting {
            return Err(TrackingError::NotCommuting { id: incident, status: inc.status() });
        }
        let responder = inc.assigned_to().ok_or(TrackingError::NoAssignee(incident))?;

        let mut sessions = lock(&self.sessions);
        if sessions.contains_key(&incident) {
            return Ok(Vec::new());
        }
        // Subscribe before reading the current position so no sample falls
        // between the two.
        let feed = self.registry.subscribe(responder);
        let current = self.registry.get(responder).map(|u| u.position);

        let t = self.thresholds;
        let mut session = TrackingSession {
            incident,
            responder,
            target:        inc.position,
            last_position: None,
            detector:      ArrivalDetector::new(
                incident,
                responder,
                t.arrival_m,
                t.departure_m,
                t.staleness_ticks,
                now,
            ),
            feed,
        };
        let signals = match current {
            Some(pos) => session.sample(pos, now),
            None => Vec::new(),
        };
        sessions.insert(incident, session);
        log::debug!("tracking {incident} via {responder}");
        Ok(signals)
    }

    /// Stop tracking and release the subscription.
    pub fn stop(&self, incident: IncidentId) -> bool {
        let removed = lock(&self.sessions).remove(&incident);
        if removed.is_some() {
            log::debug!("stopped tracking {incident}");
        }
        removed.is_some()
    }

    /// Drain every session's feed and check staleness.
    ///
    /// Sessions whose incident has been archived, cancelled, or removed are
    /// closed.
    pub fn poll(&self, now: Tick) -> Vec<TrackingSignal> {
        let ids: Vec<IncidentId> = lock(&self.sessions).keys().copied().collect();
        let finished: Vec<IncidentId> = ids
            .into_iter()
            .filter(|id| self.incidents.get(*id).is_none_or(|inc| inc.status().is_terminal()))
            .collect();

        let mut sessions = lock(&self.sessions);
        for id in &finished {
            sessions.remove(id);
        }

        let mut out = Vec::new();
        for session in sessions.values_mut() {
            for update in session.feed.drain() {
                out.extend(session.sample(update.position, update.tick));
            }
            if let Some(lost) = session.detector.check_staleness(now) {
                log::warn!(
                    "{}: no position from {} since {}",
                    session.incident, session.responder, session.detector.last_sample()
                );
                out.push(lost);
            }
        }
        out
    }

    /// Consume an arrival signal for `incident`.
    pub fn acknowledge(&self, incident: IncidentId) -> TrackingResult<Option<TrackingSignal>> {
        let mut sessions = lock(&self.sessions);
        let session = sessions.get_mut(&incident).ok_or(TrackingError::NotTracking(incident))?;
        Ok(session.detector.acknowledge())
    }

    /// Current great-circle distance from the assigned unit to `incident`,
    /// from the registry's latest position.
    pub fn distance_to_incident(&self, incident: IncidentId) -> TrackingResult<f64> {
        let (from, to) = self.endpoints(incident)?;
        Ok(from.distance_m(to))
    }

    /// Route estimate for display.
    pub fn route(&self, incident: IncidentId) -> TrackingResult<RouteEstimate> {
        let (from, to) = self.endpoints(incident)?;
        self.directions.route(from, to)
    }

    fn endpoints(&self, incident: IncidentId) -> TrackingResult<(Coordinate, Coordinate)> {
        let inc = self.incidents.get(incident).ok_or(TrackingError::IncidentNotFound(incident))?;
        let responder = inc.assigned_to().ok_or(TrackingError::NoAssignee(incident))?;
        let unit = self.registry.get(responder).ok_or(TrackingError::ResponderNotFound(responder))?;
        Ok((unit.position, inc.position))
    }

    pub fn is_tracking(&self, incident: IncidentId) -> bool {
        lock(&self.sessions).contains_key(&incident)
    }

    pub fn is_arrived(&self, incident: IncidentId) -> bool {
        lock(&self.sessions).get(&incident).is_some_and(|s| s.detector.is_arrived())
    }

    pub fn session_count(&self) -> usize {
        lock(&self.sessions).len()
    }
}
