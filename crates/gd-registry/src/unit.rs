//! Per-unit live state.

use gd_core::{Coordinate, Department, IncidentId, ResponderId, Tick};
use gd_zone::ZoneKey;

use crate::{RegistryError, RegistryResult};

/// Whether a unit can take a new task.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponderStatus {
    #[default]
    Available,
    Engaged,
}

impl ResponderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponderStatus::Available => "AVAILABLE",
            ResponderStatus::Engaged   => "ENGAGED",
        }
    }
}

impl std::fmt::Display for ResponderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position report from a field unit.  Creates the unit on first sight.
#[derive(Clone, Debug, PartialEq)]
pub struct Heartbeat {
    pub responder:  ResponderId,
    pub name:       String,
    pub department: Department,
    pub position:   Coordinate,
}

/// One field unit as held in the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponderUnit {
    pub id:         ResponderId,
    /// Roster zone derived from `position` at the registry's precision.
    pub zone:       ZoneKey,
    /// Fixed at first registration.
    pub department: Department,
    pub name:       String,
    pub position:   Coordinate,
    /// Tick of the most recent heartbeat.
    pub last_seen:  Tick,

    status:       ResponderStatus,
    current_task: Option<IncidentId>,
    /// Cleared when presence expires; a caller holding a stale handle must
    /// not engage a unit that is no longer on the roster.
    present:      bool,
}

impl ResponderUnit {
    pub(crate) fn new(hb: Heartbeat, zone: ZoneKey, now: Tick) -> Self {
        Self {
            id:           hb.responder,
            zone,
            department:   hb.department,
            name:         hb.name,
            position:     hb.position,
            last_seen:    now,
            status:       ResponderStatus::Available,
            current_task: None,
            present:      true,
        }
    }

    #[inline]
    pub fn status(&self) -> ResponderStatus {
        self.status
    }

    #[inline]
    pub fn current_task(&self) -> Option<IncidentId> {
        self.current_task
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// On the roster and free to take a task.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.present && self.status == ResponderStatus::Available
    }

    /// Conditional `AVAILABLE → ENGAGED` flip.
    ///
    /// Fails without modifying anything unless the unit is present and
    /// available at the moment of the call.
    pub fn engage(&mut self, task: IncidentId) -> RegistryResult<()> {
        if !self.is_available() {
            return Err(RegistryError::NotAvailable(self.id));
        }
        self.status = ResponderStatus::Engaged;
        self.current_task = Some(task);
        Ok(())
    }

    /// Conditional `ENGAGED → AVAILABLE` flip, only for the task it holds.
    pub fn release(&mut self, task: IncidentId) -> RegistryResult<()> {
        if self.current_task != Some(task) {
            return Err(RegistryError::TaskMismatch {
                responder: self.id,
                held:      self.current_task,
                requested: task,
            });
        }
        self.status = ResponderStatus::Available;
        self.current_task = None;
        Ok(())
    }

    pub(crate) fn retire(&mut self) {
        self.present = false;
    }
}
