//! `ArrivalDetector` — per-incident arrival and signal-loss state.
//!
//! ```text
//!             d <= arrival, not acked
//!   AWAY ───────────────────────────────► ARRIVED
//!    ▲                                      │
//!    └───── d > departure, or acknowledged ─┘
//! ```
//!
//! Between the two thresholds the state holds, so a unit parked near the
//! arrival radius does not flap.  Once acknowledged the incident never
//! raises `Arrived` again.

use gd_core::{IncidentId, ResponderId, Tick};

/// UI-facing tracking event.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackingSignal {
    Arrived      { incident: IncidentId, responder: ResponderId, distance_m: f64 },
    Departed     { incident: IncidentId, responder: ResponderId, distance_m: f64 },
    Acknowledged { incident: IncidentId, responder: ResponderId },
    /// No position sample since `last_sample`.
    SignalLost     { incident: IncidentId, responder: ResponderId, last_sample: Tick },
    SignalRestored { incident: IncidentId, responder: ResponderId },
}

impl TrackingSignal {
    pub fn incident(&self) -> IncidentId {
        match *self {
            TrackingSignal::Arrived { incident, .. }
            | TrackingSignal::Departed { incident, .. }
            | TrackingSignal::Acknowledged { incident, .. }
            | TrackingSignal::SignalLost { incident, .. }
            | TrackingSignal::SignalRestored { incident, .. } => incident,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ArrivalDetector {
    incident:        IncidentId,
    responder:       ResponderId,
    arrival_m:       f64,
    departure_m:     f64,
    staleness_ticks: u64,

    arrived:       bool,
    acknowledged:  bool,
    lost:          bool,
    last_sample:   Tick,
    last_distance: Option<f64>,
}

impl ArrivalDetector {
    /// `started` counts as the first sample for staleness purposes.
    pub fn new(
        incident:        IncidentId,
        responder:       ResponderId,
        arrival_m:       f64,
        departure_m:     f64,
        staleness_ticks: u64,
        started:         Tick,
    ) -> Self {
        Self {
            incident,
            responder,
            arrival_m,
            departure_m,
            staleness_ticks,
            arrived:       false,
            acknowledged:  false,
            lost:          false,
            last_sample:   started,
            last_distance: None,
        }
    }

    /// Feed one distance sample.  May emit a restore and an arrival together.
    pub fn observe(&mut self, distance_m: f64, now: Tick) -> Vec<TrackingSignal> {
        let (incident, responder) = (self.incident, self.responder);
        let mut out = Vec::new();

        self.last_sample = self.last_sample.max(now);
        self.last_distance = Some(distance_m);
        if self.lost {
            self.lost = false;
            out.push(TrackingSignal::SignalRestored { incident, responder });
        }

        if !self.arrived && !self.acknowledged && distance_m <= self.arrival_m {
            self.arrived = true;
            out.push(TrackingSignal::Arrived { incident, responder, distance_m });
        } else if self.arrived && distance_m > self.departure_m {
            self.arrived = false;
            out.push(TrackingSignal::Departed { incident, responder, distance_m });
        }
        out
    }

    /// Consume the arrival.  Later samples never re-raise it.
    pub fn acknowledge(&mut self) -> Option<TrackingSignal> {
        let was_arrived = self.arrived;
        self.acknowledged = true;
        self.arrived = false;
        was_arrived.then_some(TrackingSignal::Acknowledged {
            incident:  self.incident,
            responder: self.responder,
        })
    }

    /// Raise `SignalLost` once when the last sample is too old.
    pub fn check_staleness(&mut self, now: Tick) -> Option<TrackingSignal> {
        if self.lost || now.since(self.last_sample) <= self.staleness_ticks {
            return None;
        }
        self.lost = true;
        Some(TrackingSignal::SignalLost {
            incident:    self.incident,
            responder:   self.responder,
            last_sample: self.last_sample,
        })
    }

    #[inline]
    pub fn is_arrived(&self) -> bool {
        self.arrived
    }

    #[inline]
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    #[inline]
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    #[inline]
    pub fn last_sample(&self) -> Tick {
        self.last_sample
    }

    #[inline]
    pub fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }
}
