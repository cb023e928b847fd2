//! Unit tests for gd-broadcast.

#[cfg(test)]
mod board {
    use gd_core::{Coordinate, DispatchConfig, IncidentId, Tick, UserId};
    use gd_zone::ZoneKey;

    use crate::{BroadcastError, ThreatBoard};

    // 9q8yy0: lat 37.7490..37.7545, lng -122.4316..-122.4207
    const VICTIM: (f64, f64) = (37.7520, -122.4280);

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn board() -> ThreatBoard {
        ThreatBoard::from_config(&DispatchConfig::default()).unwrap()
    }

    #[test]
    fn marker_lands_in_fine_bucket() {
        let b = board();
        let zone = b.activate(UserId(1), IncidentId(10), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();
        assert_eq!(zone.as_str(), "9q8yy0");
        assert_eq!(b.markers_in(&zone).len(), 1);
    }

    #[test]
    fn observer_within_radius_sees_marker() {
        let b = board();
        b.activate(UserId(1), IncidentId(10), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();

        // ~111 m north.
        let seen = b.nearby(UserId(2), c(37.7530, -122.4280)).unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].incident, IncidentId(10));
        assert!((seen[0].distance_m - 111.2).abs() < 1.0, "{}", seen[0].distance_m);

        // ~267 m north, same bucket.
        assert!(b.nearby(UserId(2), c(37.7544, -122.4280)).unwrap().is_empty());
    }

    #[test]
    fn own_marker_is_hidden() {
        let b = board();
        b.activate(UserId(1), IncidentId(10), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();
        assert!(b.nearby(UserId(1), c(VICTIM.0, VICTIM.1)).unwrap().is_empty());
    }

    #[test]
    fn results_are_nearest_first() {
        let b = board();
        b.activate(UserId(1), IncidentId(10), c(37.7520, -122.4280), Tick(0)).unwrap();
        b.activate(UserId(3), IncidentId(11), c(37.7526, -122.4280), Tick(0)).unwrap();
        let seen = b.nearby(UserId(2), c(37.7530, -122.4280)).unwrap();
        let owners: Vec<UserId> = seen.iter().map(|t| t.owner).collect();
        assert_eq!(owners, [UserId(3), UserId(1)]);
    }

    #[test]
    fn neighbor_scan_crosses_cell_edge() {
        let plain = board();
        let wide = board().with_neighbors(true);
        for b in [&plain, &wide] {
            b.activate(UserId(1), IncidentId(10), c(37.7543, -122.4280), Tick(0)).unwrap();
        }
        // ~44 m away but in 9q8yy1.
        let observer = c(37.7547, -122.4280);
        assert!(plain.nearby(UserId(2), observer).unwrap().is_empty());
        assert_eq!(wide.nearby(UserId(2), observer).unwrap().len(), 1);
    }

    #[test]
    fn moving_marker_changes_bucket() {
        let b = board();
        b.activate(UserId(1), IncidentId(10), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();
        let zone = b.move_marker(UserId(1), c(37.7560, -122.4280), Tick(5)).unwrap();
        assert_eq!(zone.as_str(), "9q8yy1");
        let old: ZoneKey = "9q8yy0".parse().unwrap();
        assert!(b.markers_in(&old).is_empty());
        let m = b.get(UserId(1)).unwrap();
        assert_eq!(m.zone, zone);
        assert_eq!(m.raised_at, Tick(0));
        assert_eq!(m.updated_at, Tick(5));

        assert!(matches!(
            b.move_marker(UserId(9), c(VICTIM.0, VICTIM.1), Tick(5)),
            Err(BroadcastError::MarkerNotFound(UserId(9)))
        ));
    }

    #[test]
    fn reactivation_replaces() {
        let b = board();
        b.activate(UserId(1), IncidentId(10), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();
        b.activate(UserId(1), IncidentId(12), c(37.7560, -122.4280), Tick(3)).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b.get(UserId(1)).unwrap().incident, IncidentId(12));
    }

    #[test]
    fn clearing() {
        let b = board();
        b.activate(UserId(1), IncidentId(10), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();
        b.activate(UserId(2), IncidentId(11), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();
        b.activate(UserId(3), IncidentId(12), c(VICTIM.0, VICTIM.1), Tick(0)).unwrap();

        assert!(b.clear(UserId(1)));
        assert!(!b.clear(UserId(1)));
        assert_eq!(b.clear_incident(IncidentId(11)), 1);
        assert_eq!(b.retain_active(|id| id != IncidentId(12)), 1);
        assert!(b.is_empty());
    }
}
