//! Unit tests for gd-tracking.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use gd_core::{Coordinate, Department, DispatchConfig, IncidentId, ResponderId, Tick, UserId};
    use gd_incident::{IncidentStore, NewIncident, Severity};
    use gd_registry::{Heartbeat, ResponderRegistry};

    use crate::Tracker;

    pub const SCENE: (f64, f64) = (37.7520, -122.4280);

    pub fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    pub struct World {
        pub registry:  Arc<ResponderRegistry>,
        pub incidents: Arc<IncidentStore>,
        pub tracker:   Tracker,
    }

    impl World {
        pub fn new() -> Self {
            let registry = Arc::new(ResponderRegistry::default());
            let incidents = Arc::new(IncidentStore::default());
            let tracker = Tracker::new(Arc::clone(&registry), Arc::clone(&incidents), &DispatchConfig::default());
            Self { registry, incidents, tracker }
        }

        pub fn beat(&self, lat: f64, lng: f64, now: Tick) {
            self.registry
                .heartbeat(
                    Heartbeat {
                        responder:  ResponderId(1),
                        name:       "Engine 1".into(),
                        department: Department::Fire,
                        position:   c(lat, lng),
                    },
                    now,
                )
                .unwrap();
        }

        /// A commuting incident at `SCENE` assigned to responder 1, which
        /// starts `lat_offset` degrees north of the scene.
        pub fn commuting(&self, lat_offset: f64) -> IncidentId {
            self.beat(SCENE.0 + lat_offset, SCENE.1, Tick(0));
            let inc = self
                .incidents
                .raise(
                    NewIncident {
                        reporter:   UserId(1),
                        department: Department::Fire,
                        severity:   Severity::Critical,
                        position:   c(SCENE.0, SCENE.1),
                        address:    "Mission & 24th".into(),
                    },
                    Tick(0),
                )
                .unwrap();
            {
                let ih = self.incidents.handle(inc.id).unwrap();
                let uh = self.registry.handle(ResponderId(1)).unwrap();
                let mut i = ih.lock().unwrap();
                let mut u = uh.lock().unwrap();
                u.engage(inc.id).unwrap();
                i.assign(u.id, &u.name, Tick(0)).unwrap();
            }
            self.incidents.start_commute(inc.id).unwrap();
            inc.id
        }
    }
}

// ── Detector ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod detector {
    use gd_core::{IncidentId, ResponderId, Tick};

    use crate::{ArrivalDetector, TrackingSignal};

    fn det() -> ArrivalDetector {
        ArrivalDetector::new(IncidentId(1), ResponderId(1), 50.0, 100.0, 30, Tick(0))
    }

    #[test]
    fn arrives_at_zero_and_clears_at_150() {
        let mut d = det();
        let s = d.observe(0.0, Tick(1));
        assert!(matches!(s.as_slice(), [TrackingSignal::Arrived { .. }]));
        assert!(d.is_arrived());

        let s = d.observe(150.0, Tick(2));
        assert!(matches!(s.as_slice(), [TrackingSignal::Departed { .. }]));
        assert!(!d.is_arrived());
    }

    #[test]
    fn arrival_fires_once() {
        let mut d = det();
        assert_eq!(d.observe(40.0, Tick(1)).len(), 1);
        assert!(d.observe(10.0, Tick(2)).is_empty());
        assert!(d.observe(49.0, Tick(3)).is_empty());
    }

    #[test]
    fn hysteresis_band_holds_state() {
        let mut d = det();
        assert!(d.observe(75.0, Tick(1)).is_empty());
        assert!(!d.is_arrived());
        d.observe(50.0, Tick(2));
        assert!(d.is_arrived());
        assert!(d.observe(99.0, Tick(3)).is_empty());
        assert!(d.is_arrived());
        assert!(d.observe(100.0, Tick(4)).is_empty());
        assert_eq!(d.observe(100.5, Tick(5)).len(), 1);
    }

    #[test]
    fn departure_allows_rearrival() {
        let mut d = det();
        d.observe(0.0, Tick(1));
        d.observe(500.0, Tick(2));
        let s = d.observe(20.0, Tick(3));
        assert!(matches!(s.as_slice(), [TrackingSignal::Arrived { .. }]));
    }

    #[test]
    fn acknowledgement_clears_and_suppresses() {
        let mut d = det();
        d.observe(0.0, Tick(1));
        assert!(matches!(d.acknowledge(), Some(TrackingSignal::Acknowledged { .. })));
        assert!(!d.is_arrived());
        assert!(d.observe(0.0, Tick(2)).is_empty());
        d.observe(500.0, Tick(3));
        assert!(d.observe(0.0, Tick(4)).is_empty());
        assert!(d.acknowledge().is_none());
    }

    #[test]
    fn staleness_is_raised_once_and_restored() {
        let mut d = det();
        d.observe(300.0, Tick(10));
        assert!(d.check_staleness(Tick(40)).is_none());
        let lost = d.check_staleness(Tick(41)).unwrap();
        assert_eq!(
            lost,
            TrackingSignal::SignalLost { incident: IncidentId(1), responder: ResponderId(1), last_sample: Tick(10) }
        );
        assert!(d.check_staleness(Tick(90)).is_none());

        let s = d.observe(20.0, Tick(91));
        assert!(matches!(
            s.as_slice(),
            [TrackingSignal::SignalRestored { .. }, TrackingSignal::Arrived { .. }]
        ));
        assert!(!d.is_lost());
    }
}

// ── Tracker ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tracker {
    use gd_core::{IncidentId, ResponderId, Tick};
    use gd_incident::IncidentStatus;

    use super::helpers::{SCENE, World};
    use crate::{TrackingError, TrackingSignal};

    #[test]
    fn follows_the_unit_to_the_scene() {
        let w = World::new();
        // ~1 km out.
        let inc = w.commuting(0.009);
        assert!(w.tracker.start(inc, Tick(1)).unwrap().is_empty());
        assert_eq!(w.registry.subscriber_count(ResponderId(1)), 1);

        w.beat(SCENE.0 + 0.004, SCENE.1, Tick(2));
        assert!(w.tracker.poll(Tick(2)).is_empty());

        // ~35 m east of the scene.
        w.beat(SCENE.0, SCENE.1 + 0.0004, Tick(3));
        let s = w.tracker.poll(Tick(3));
        assert!(matches!(s.as_slice(), [TrackingSignal::Arrived { incident, .. }] if *incident == inc));
        assert!(w.tracker.is_arrived(inc));

        // ~150 m north.
        w.beat(SCENE.0 + 0.00135, SCENE.1, Tick(4));
        let s = w.tracker.poll(Tick(4));
        assert!(matches!(s.as_slice(), [TrackingSignal::Departed { .. }]));
    }

    #[test]
    fn start_on_scene_arrives_immediately() {
        let w = World::new();
        let inc = w.commuting(0.0);
        let s = w.tracker.start(inc, Tick(1)).unwrap();
        assert!(matches!(s.as_slice(), [TrackingSignal::Arrived { distance_m, .. }] if *distance_m < 1.0));
        // Starting again is a no-op.
        assert!(w.tracker.start(inc, Tick(2)).unwrap().is_empty());
        assert_eq!(w.tracker.session_count(), 1);
    }

    #[test]
    fn start_requires_commuting() {
        let w = World::new();
        let inc = w.commuting(0.01);
        w.incidents
            .compare_and_transition(inc, IncidentStatus::Commuting, IncidentStatus::Resolved, Tick(1))
            .unwrap();
        assert!(matches!(
            w.tracker.start(inc, Tick(1)),
            Err(TrackingError::NotCommuting { status: IncidentStatus::Resolved, .. })
        ));
        assert!(matches!(w.tracker.start(IncidentId(99), Tick(1)), Err(TrackingError::IncidentNotFound(_))));
    }

    #[test]
    fn stop_releases_subscription() {
        let w = World::new();
        let inc = w.commuting(0.01);
        w.tracker.start(inc, Tick(1)).unwrap();
        assert!(w.tracker.stop(inc));
        assert!(!w.tracker.stop(inc));
        assert_eq!(w.registry.subscriber_count(ResponderId(1)), 0);
    }

    #[test]
    fn silent_unit_raises_signal_lost() {
        let w = World::new();
        let inc = w.commuting(0.01);
        w.tracker.start(inc, Tick(0)).unwrap();
        assert!(w.tracker.poll(Tick(30)).is_empty());
        let s = w.tracker.poll(Tick(31));
        assert!(matches!(s.as_slice(), [TrackingSignal::SignalLost { .. }]));
        assert!(w.tracker.poll(Tick(60)).is_empty());

        w.beat(SCENE.0 + 0.01, SCENE.1, Tick(61));
        let s = w.tracker.poll(Tick(61));
        assert!(matches!(s.as_slice(), [TrackingSignal::SignalRestored { .. }]));
    }

    #[test]
    fn acknowledge_needs_session() {
        let w = World::new();
        let inc = w.commuting(0.0);
        assert!(matches!(w.tracker.acknowledge(inc), Err(TrackingError::NotTracking(_))));
        w.tracker.start(inc, Tick(0)).unwrap();
        assert!(w.tracker.acknowledge(inc).unwrap().is_some());
        assert!(!w.tracker.is_arrived(inc));
    }

    #[test]
    fn distance_and_route() {
        let w = World::new();
        let inc = w.commuting(0.009);
        let d = w.tracker.distance_to_incident(inc).unwrap();
        assert!((d - 1_000.75).abs() < 1.0, "{d}");
        let r = w.tracker.route(inc).unwrap();
        assert_eq!(r.distance_m, d);
        // 1 km at 30 km/h is two minutes.
        assert_eq!(r.eta_secs, 121);
    }

    #[test]
    fn poll_closes_finished_sessions() {
        let w = World::new();
        let inc = w.commuting(0.0);
        w.tracker.start(inc, Tick(0)).unwrap();
        w.incidents
            .compare_and_transition(inc, IncidentStatus::Commuting, IncidentStatus::Resolved, Tick(1))
            .unwrap();
        w.tracker.poll(Tick(1));
        assert!(w.tracker.is_tracking(inc));
        w.incidents
            .compare_and_transition(inc, IncidentStatus::Resolved, IncidentStatus::Archived, Tick(2))
            .unwrap();
        w.tracker.poll(Tick(2));
        assert!(!w.tracker.is_tracking(inc));
        assert_eq!(w.registry.subscriber_count(ResponderId(1)), 0);
    }
}
