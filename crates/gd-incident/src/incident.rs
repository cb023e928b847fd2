//! The `Incident` record and its guarded mutators.

use gd_core::{Coordinate, Department, IncidentId, ResponderId, Tick, UserId};
use gd_zone::ZoneKey;

use crate::{IncidentError, IncidentResult, IncidentStatus, Severity};

/// What a reporter submits.
#[derive(Clone, Debug, PartialEq)]
pub struct NewIncident {
    pub reporter:   UserId,
    pub department: Department,
    pub severity:   Severity,
    pub position:   Coordinate,
    pub address:    String,
}

/// The unit attached to an incident.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub responder:      ResponderId,
    pub responder_name: String,
    pub assigned_at:    Tick,
}

/// One live incident.
///
/// `status`, `assignment` and `resolved_at` are private: they only change
/// through the conditional mutators below, which keep `assignment` set
/// exactly while the status is `ASSIGNED`, `COMMUTING` or `RESOLVED`.
#[derive(Clone, Debug, PartialEq)]
pub struct Incident {
    pub id:         IncidentId,
    pub zone:       ZoneKey,
    pub reporter:   UserId,
    pub department: Department,
    pub severity:   Severity,
    pub position:   Coordinate,
    pub address:    String,
    pub created_at: Tick,

    status:      IncidentStatus,
    assignment:  Option<Assignment>,
    resolved_at: Option<Tick>,
}

impl Incident {
    pub(crate) fn new(id: IncidentId, zone: ZoneKey, new: NewIncident, now: Tick) -> Self {
        Self {
            id,
            zone,
            reporter:    new.reporter,
            department:  new.department,
            severity:    new.severity,
            position:    new.position,
            address:     new.address,
            created_at:  now,
            status:      IncidentStatus::Raised,
            assignment:  None,
            resolved_at: None,
        }
    }

    #[inline]
    pub fn status(&self) -> IncidentStatus {
        self.status
    }

    #[inline]
    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    #[inline]
    pub fn assigned_to(&self) -> Option<ResponderId> {
        self.assignment.as_ref().map(|a| a.responder)
    }

    #[inline]
    pub fn resolved_at(&self) -> Option<Tick> {
        self.resolved_at
    }

    fn expect(&self, expected: IncidentStatus) -> IncidentResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(IncidentError::Conflict { id: self.id, expected, actual: self.status })
        }
    }

    /// `RAISED → ASSIGNED`, recording the assignee.
    pub fn assign(&mut self, responder: ResponderId, name: &str, now: Tick) -> IncidentResult<()> {
        self.expect(IncidentStatus::Raised)?;
        self.status = IncidentStatus::Assigned;
        self.assignment = Some(Assignment {
            responder,
            responder_name: name.to_owned(),
            assigned_at: now,
        });
        Ok(())
    }

    /// `ASSIGNED → COMMUTING`.  Returns `false` if already commuting.
    pub fn start_commute(&mut self) -> IncidentResult<bool> {
        if self.status == IncidentStatus::Commuting {
            return Ok(false);
        }
        self.transition(IncidentStatus::Assigned, IncidentStatus::Commuting, Tick::ZERO)?;
        Ok(true)
    }

    /// Move from `expected` to `next` if both the current state and the edge
    /// allow it.  `RAISED → ASSIGNED` is refused here; use [`assign`].
    ///
    /// [`assign`]: Incident::assign
    pub fn transition(
        &mut self,
        expected: IncidentStatus,
        next:     IncidentStatus,
        now:      Tick,
    ) -> IncidentResult<()> {
        self.expect(expected)?;
        if !expected.can_transition_to(next) {
            return Err(IncidentError::InvalidTransition { id: self.id, from: expected, to: next });
        }
        match next {
            IncidentStatus::Assigned => return Err(IncidentError::NeedsAssignee(self.id)),
            IncidentStatus::Resolved => self.resolved_at = Some(now),
            IncidentStatus::Commuting => self.resolved_at = None,
            IncidentStatus::Archived | IncidentStatus::Cancelled => self.assignment = None,
            IncidentStatus::Raised => {}
        }
        self.status = next;
        Ok(())
    }
}
