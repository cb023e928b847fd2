//! Engine configuration.
//!
//! Every tunable lives in [`DispatchConfig`].  Durations are given in
//! seconds and converted to ticks with the `*_ticks()` helpers, so changing
//! `tick_duration_secs` never changes the wall-clock meaning of a timer.

use crate::{Clock, CoreError, CoreResult, Department};

/// Top-level engine configuration.
///
/// Typically loaded from a JSON file by the application crate (with the
/// `serde` feature) and passed to the service builder.  Missing fields take
/// their [`Default`] values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Seconds per tick.  Default: 1.
    pub tick_duration_secs: u32,

    /// Period of the automatic sweep over still-RAISED incidents.
    pub sweep_interval_secs: u64,

    /// Length of the manual-assignment countdown for non-emergency
    /// departments.  When it elapses the engine assigns automatically.
    pub manual_window_secs: u64,

    /// A responder at or below this distance is physically on scene.
    pub arrival_threshold_m: f64,

    /// An arrived responder beyond this distance has left the scene.  Must
    /// exceed `arrival_threshold_m` so the signal does not flap.
    pub departure_threshold_m: f64,

    /// No position sample for this long raises a lost-signal condition.
    pub staleness_secs: u64,

    /// AVAILABLE units silent for this long are dropped from the registry.
    pub presence_ttl_secs: u64,

    /// Radius within which co-located observers are warned of an SOS.
    pub threat_radius_m: f64,

    /// Window after creation during which a reporter may rescind an incident.
    pub cancel_grace_secs: u64,

    /// A new emergency report this close to a live one of the same
    /// department is a duplicate.  Only the report's own cell is searched.
    /// `0` disables the check.
    pub emergency_duplicate_radius_m: f64,

    /// Duplicate radius for the other departments.  The report's cell and its
    /// eight neighbors are searched.  `0` disables the check.
    pub duplicate_radius_m: f64,

    /// Archive attempts per confirmation before giving up.
    pub archive_max_attempts: u32,

    /// Geohash length for responder and incident rosters.
    pub roster_precision: u8,

    /// Geohash length for threat-broadcast markers.  Finer than
    /// `roster_precision`.
    pub threat_precision: u8,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            start_unix_secs:              0,
            tick_duration_secs:           1,
            sweep_interval_secs:          120,
            manual_window_secs:           60,
            arrival_threshold_m:          50.0,
            departure_threshold_m:        100.0,
            staleness_secs:               30,
            presence_ttl_secs:            90,
            threat_radius_m:              200.0,
            cancel_grace_secs:            3,
            emergency_duplicate_radius_m: 15.0,
            duplicate_radius_m:           6.0,
            archive_max_attempts:         3,
            roster_precision:             5,
            threat_precision:             6,
        }
    }
}

impl DispatchConfig {
    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_duration_secs == 0 {
            return Err(CoreError::Config("tick_duration_secs must be > 0".into()));
        }
        if self.sweep_interval_secs == 0 {
            return Err(CoreError::Config("sweep_interval_secs must be > 0".into()));
        }
        if !(self.arrival_threshold_m > 0.0) {
            return Err(CoreError::Config("arrival_threshold_m must be > 0".into()));
        }
        if !(self.departure_threshold_m > self.arrival_threshold_m) {
            return Err(CoreError::Config(format!(
                "departure_threshold_m ({}) must exceed arrival_threshold_m ({})",
                self.departure_threshold_m, self.arrival_threshold_m,
            )));
        }
        if !(self.threat_radius_m > 0.0) {
            return Err(CoreError::Config("threat_radius_m must be > 0".into()));
        }
        if !(self.emergency_duplicate_radius_m >= 0.0) || !(self.duplicate_radius_m >= 0.0) {
            return Err(CoreError::Config("duplicate radii must be >= 0".into()));
        }
        if self.archive_max_attempts == 0 {
            return Err(CoreError::Config("archive_max_attempts must be >= 1".into()));
        }
        if !(1..=12).contains(&self.roster_precision) || !(1..=12).contains(&self.threat_precision) {
            return Err(CoreError::Config("zone precisions must be in 1..=12".into()));
        }
        if self.roster_precision >= self.threat_precision {
            return Err(CoreError::Config(format!(
                "roster_precision ({}) must be coarser than threat_precision ({})",
                self.roster_precision, self.threat_precision,
            )));
        }
        Ok(())
    }

    /// Construct a `Clock` pre-configured for this run.
    pub fn make_clock(&self) -> Clock {
        Clock::new(self.start_unix_secs, self.tick_duration_secs)
    }

    /// Duplicate-search radius for a new report of `department`.
    pub fn duplicate_radius_for(&self, department: Department) -> f64 {
        if department.is_emergency() {
            self.emergency_duplicate_radius_m
        } else {
            self.duplicate_radius_m
        }
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    #[inline]
    fn ticks(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_duration_secs.max(1) as u64)
    }

    pub fn sweep_interval_ticks(&self) -> u64 {
        self.ticks(self.sweep_interval_secs).max(1)
    }

    pub fn manual_window_ticks(&self) -> u64 {
        self.ticks(self.manual_window_secs)
    }

    pub fn staleness_ticks(&self) -> u64 {
        self.ticks(self.staleness_secs)
    }

    pub fn presence_ttl_ticks(&self) -> u64 {
        self.ticks(self.presence_ttl_secs)
    }

    pub fn cancel_grace_ticks(&self) -> u64 {
        self.ticks(self.cancel_grace_secs)
    }
}
