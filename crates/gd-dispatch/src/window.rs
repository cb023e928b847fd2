//! `ManualWindows` — countdown deadlines for manual assignment.
//!
//! Non-emergency incidents open a window during which a human may pick a
//! unit.  Deadlines live in a `BTreeMap<Tick, Vec<IncidentId>>` so each tick
//! only touches the windows that are actually due.  Cancelled windows are
//! dropped from the id index immediately and skipped lazily when their
//! deadline bucket drains.

use std::collections::{BTreeMap, HashMap};

use gd_core::{IncidentId, Tick};

#[derive(Default, Debug)]
pub struct ManualWindows {
    deadlines: BTreeMap<Tick, Vec<IncidentId>>,
    open:      HashMap<IncidentId, Tick>,
}

impl ManualWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or restart) the window for `incident`, closing at `deadline`.
    pub fn open(&mut self, incident: IncidentId, deadline: Tick) {
        self.open.insert(incident, deadline);
        self.deadlines.entry(deadline).or_default().push(incident);
    }

    /// Close the window early.  Returns `false` if none was open.
    pub fn cancel(&mut self, incident: IncidentId) -> bool {
        self.open.remove(&incident).is_some()
    }

    pub fn is_open(&self, incident: IncidentId) -> bool {
        self.open.contains_key(&incident)
    }

    pub fn deadline(&self, incident: IncidentId) -> Option<Tick> {
        self.open.get(&incident).copied()
    }

    /// Remove and return every open window whose deadline is `<= now`,
    /// in deadline order.
    pub fn drain_due(&mut self, now: Tick) -> Vec<IncidentId> {
        let mut due = Vec::new();
        while let Some(entry) = self.deadlines.first_entry() {
            if *entry.key() > now {
                break;
            }
            let (tick, ids) = entry.remove_entry();
            for id in ids {
                // Skip cancelled windows and ones restarted with a later deadline.
                if self.open.get(&id) == Some(&tick) {
                    self.open.remove(&id);
                    due.push(id);
                }
            }
        }
        due
    }

    /// The earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Tick> {
        self.open.values().min().copied()
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}
