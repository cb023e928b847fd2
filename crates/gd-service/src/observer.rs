//! Service observer trait for progress reporting and data collection.

use gd_core::{ResponderId, Tick};
use gd_dispatch::{AssignmentAttempt, SweepReport};
use gd_resolution::ArchiveReceipt;
use gd_tracking::TrackingSignal;

/// What one tick of [`Service::run_ticks`][crate::Service::run_ticks] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSummary {
    /// Automatic assignments made this tick (window expiry and sweep).
    pub assigned:        usize,
    /// Units dropped by presence expiry.
    pub expired_units:   Vec<ResponderId>,
    pub signals:         usize,
    pub markers_cleared: usize,
}

/// Callbacks invoked by [`Service::run_ticks`][crate::Service::run_ticks]
/// at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: assignment logger
///
/// ```rust,ignore
/// struct Assignments(Vec<IncidentId>);
///
/// impl ServiceObserver for Assignments {
///     fn on_assignment(&mut self, _tick: Tick, a: &AssignmentAttempt) {
///         self.0.push(a.incident);
///     }
/// }
/// ```
pub trait ServiceObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every automatic assignment.
    fn on_assignment(&mut self, _tick: Tick, _attempt: &AssignmentAttempt) {}

    /// Called after each periodic sweep.
    fn on_sweep(&mut self, _tick: Tick, _report: &SweepReport) {}

    /// Called for every arrival, departure, or signal-loss event.
    fn on_signal(&mut self, _tick: Tick, _signal: &TrackingSignal) {}

    /// Called when a deferred archive write finally succeeds.
    fn on_archived(&mut self, _tick: Tick, _receipt: &ArchiveReceipt) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}
}

/// A [`ServiceObserver`] that does nothing.
pub struct NoopObserver;

impl ServiceObserver for NoopObserver {}
