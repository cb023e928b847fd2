//! `Dispatcher` — the single entry point for every dispatch producer.

use std::sync::Mutex;

use gd_core::{DispatchConfig, IncidentId, ResponderId, Tick};
use gd_zone::lock;

use crate::engine::{DispatchEngine, DispatchOutcome, SweepReport};
use crate::window::ManualWindows;
use crate::{DispatchError, DispatchResult};

/// Everything that can ask for a dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchTrigger {
    /// A new incident was filed.
    Raised(IncidentId),
    /// A human picked a unit.
    ManualSelect { incident: IncidentId, responder: ResponderId },
    /// A manual window ran out without a selection.
    WindowExpired(IncidentId),
    /// The periodic sweep timer fired.
    Sweep,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TriggerOutcome {
    Dispatch(DispatchOutcome),
    /// A non-emergency incident is waiting for a human until `deadline`.
    WindowOpened { incident: IncidentId, deadline: Tick },
    Sweep(SweepReport),
}

/// What one call to [`Dispatcher::tick`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Windows that expired this tick and the automatic attempt made for each.
    pub expired: Vec<(IncidentId, DispatchOutcome)>,
    pub sweep:   Option<SweepReport>,
}

pub struct Dispatcher {
    engine:         DispatchEngine,
    windows:        Mutex<ManualWindows>,
    window_ticks:   u64,
    sweep_interval: u64,
    last_sweep:     Mutex<Tick>,
}

impl Dispatcher {
    pub fn new(engine: DispatchEngine, config: &DispatchConfig) -> Self {
        Self {
            engine,
            windows:        Mutex::new(ManualWindows::new()),
            window_ticks:   config.manual_window_ticks(),
            sweep_interval: config.sweep_interval_ticks(),
            last_sweep:     Mutex::new(Tick::ZERO),
        }
    }

    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    /// Route a newly raised incident: emergency departments dispatch
    /// immediately, the rest open a manual window.
    pub fn on_raised(&self, incident: IncidentId, now: Tick) -> DispatchResult<TriggerOutcome> {
        self.handle(DispatchTrigger::Raised(incident), now)
    }

    pub fn handle(&self, trigger: DispatchTrigger, now: Tick) -> DispatchResult<TriggerOutcome> {
        match trigger {
            DispatchTrigger::Raised(id) => {
                let incident = self
                    .engine
                    .incidents()
                    .get(id)
                    .ok_or(DispatchError::IncidentNotFound(id))?;
                if incident.department.is_emergency() {
                    return Ok(TriggerOutcome::Dispatch(self.engine.try_dispatch(id, now)?));
                }
                let deadline = now + self.window_ticks;
                lock(&self.windows).open(id, deadline);
                log::debug!("{id}: manual window open until {deadline}");
                Ok(TriggerOutcome::WindowOpened { incident: id, deadline })
            }

            DispatchTrigger::ManualSelect { incident, responder } => {
                Ok(TriggerOutcome::Dispatch(self.manual_select(incident, responder, now)?))
            }

            DispatchTrigger::WindowExpired(id) => {
                lock(&self.windows).cancel(id);
                log::debug!("{id}: manual window expired, dispatching automatically");
                Ok(TriggerOutcome::Dispatch(self.engine.try_dispatch(id, now)?))
            }

            DispatchTrigger::Sweep => {
                *lock(&self.last_sweep) = now;
                let report = self.engine.sweep(now, |id| self.window_open(id));
                Ok(TriggerOutcome::Sweep(report))
            }
        }
    }

    /// A human picked `responder`.  The incident's window closes only if the
    /// assignment went through.
    pub fn manual_select(
        &self,
        incident:  IncidentId,
        responder: ResponderId,
        now:       Tick,
    ) -> DispatchResult<DispatchOutcome> {
        let outcome = self.engine.manual_assign(incident, responder, now)?;
        if outcome.is_assigned() && lock(&self.windows).cancel(incident) {
            log::debug!("{incident}: manual window closed by selection");
        }
        Ok(outcome)
    }

    /// Timer producer: fire expired windows, then the sweep if it is due.
    pub fn tick(&self, now: Tick) -> TickReport {
        let mut report = TickReport::default();

        let due = lock(&self.windows).drain_due(now);
        for id in due {
            match self.handle(DispatchTrigger::WindowExpired(id), now) {
                Ok(TriggerOutcome::Dispatch(outcome)) => report.expired.push((id, outcome)),
                Ok(_) => {}
                Err(e) => log::warn!("{id}: window-expiry dispatch failed: {e}"),
            }
        }

        let sweep_due = now.since(*lock(&self.last_sweep)) >= self.sweep_interval;
        if sweep_due {
            match self.handle(DispatchTrigger::Sweep, now) {
                Ok(TriggerOutcome::Sweep(sweep)) => report.sweep = Some(sweep),
                Ok(_) => {}
                Err(e) => log::warn!("sweep at {now} failed: {e}"),
            }
        }
        report
    }

    pub fn window_open(&self, incident: IncidentId) -> bool {
        lock(&self.windows).is_open(incident)
    }

    pub fn window_deadline(&self, incident: IncidentId) -> Option<Tick> {
        lock(&self.windows).deadline(incident)
    }

    /// Drop any window for an incident that left `RAISED` another way.
    pub fn forget(&self, incident: IncidentId) {
        lock(&self.windows).cancel(incident);
    }
}
