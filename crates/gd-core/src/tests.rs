//! Unit tests for gd-core primitives.

#[cfg(test)]
mod ids {
    use crate::{IncidentId, ResponderId, UserId};

    #[test]
    fn ordering() {
        assert!(ResponderId(0) < ResponderId(1));
        assert!(IncidentId(100) > IncidentId(99));
    }

    #[test]
    fn from_inner() {
        assert_eq!(UserId::from(3), UserId(3));
    }

    #[test]
    fn display() {
        assert_eq!(ResponderId(7).to_string(), "ResponderId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{Coordinate, CoreError, distance_meters};

    fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert!(matches!(Coordinate::new(90.5, 0.0), Err(CoreError::InvalidCoordinate { .. })));
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn zero_distance() {
        let p = c(37.7749, -122.4194);
        assert!(p.distance_m(p) < 1e-6);
    }

    #[test]
    fn symmetric() {
        let a = c(37.7749, -122.4194);
        let b = c(37.8044, -122.2712);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-6);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111.2 km
        let d = c(30.0, -88.0).distance_m(c(31.0, -88.0));
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn monotonic_along_meridian() {
        let origin = c(10.0, 10.0);
        let mut last = 0.0;
        for step in 1..20 {
            let d = origin.distance_m(c(10.0 + step as f64 * 0.001, 10.0));
            assert!(d > last);
            last = d;
        }
    }

    #[test]
    fn antipodes_do_not_produce_nan() {
        let d = c(0.0, 0.0).distance_m(c(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * 6_371_000.0).abs() < 1.0);
    }

    #[test]
    fn bbox_check() {
        let center = c(30.694, -88.043);
        assert!(c(30.700, -88.040).within_bbox(center, 0.1));
        assert!(!c(31.5, -88.043).within_bbox(center, 0.1));
    }
}

#[cfg(test)]
mod time {
    use crate::{Clock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15).since(Tick(10)), 5);
        assert_eq!(Tick(10).since(Tick(15)), 0);
    }

    #[test]
    fn clock_wall_time() {
        let mut clock = Clock::new(1_000, 2);
        assert_eq!(clock.current_unix_secs(), 1_000);
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_unix_secs(), 1_004);
        assert_eq!(clock.unix_secs_at(Tick(10)), 1_020);
    }

    #[test]
    fn ticks_for_secs_rounds_up() {
        let clock = Clock::new(0, 5);
        assert_eq!(clock.ticks_for_secs(10), 2);
        assert_eq!(clock.ticks_for_secs(11), 3);
    }
}

#[cfg(test)]
mod config {
    use crate::{Department, DispatchConfig};

    #[test]
    fn defaults_are_valid() {
        let cfg = DispatchConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.sweep_interval_ticks(), 120);
        assert_eq!(cfg.manual_window_ticks(), 60);
    }

    #[test]
    fn tick_helpers_follow_tick_duration() {
        let cfg = DispatchConfig { tick_duration_secs: 10, ..DispatchConfig::default() };
        assert_eq!(cfg.sweep_interval_ticks(), 12);
        assert_eq!(cfg.staleness_ticks(), 3);
        assert_eq!(cfg.cancel_grace_ticks(), 1);
    }

    #[test]
    fn departure_must_exceed_arrival() {
        let cfg = DispatchConfig { departure_threshold_m: 50.0, ..DispatchConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn roster_must_be_coarser_than_threat() {
        let cfg = DispatchConfig { roster_precision: 6, ..DispatchConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn duplicate_radius_depends_on_department() {
        let cfg = DispatchConfig::default();
        assert_eq!(cfg.duplicate_radius_for(Department::Fire), 15.0);
        assert_eq!(cfg.duplicate_radius_for(Department::Water), 6.0);
        assert!(!Department::Fire.scans_neighbor_cells());
        assert!(Department::Waste.scans_neighbor_cells());

        let negative = DispatchConfig { duplicate_radius_m: -1.0, ..cfg };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn zero_tick_duration_rejected() {
        let cfg = DispatchConfig { tick_duration_secs: 0, ..DispatchConfig::default() };
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod department {
    use crate::Department;

    #[test]
    fn only_fire_is_emergency() {
        assert!(Department::Fire.is_emergency());
        assert!(!Department::Waste.is_emergency());
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("Electricity".parse::<Department>().unwrap(), Department::Electricity);
        assert_eq!(Department::Infrastructure.to_string(), "infrastructure");
        assert!("police".parse::<Department>().is_err());
    }
}
