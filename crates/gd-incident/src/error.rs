use gd_core::{IncidentId, UserId};
use gd_zone::ZoneError;
use thiserror::Error;

use crate::IncidentStatus;

#[derive(Debug, Error)]
pub enum IncidentError {
    #[error("incident {0} not found")]
    NotFound(IncidentId),

    /// The record was not in the state the caller expected; someone else
    /// moved it first.
    #[error("conflict on {id}: expected {expected}, found {actual}")]
    Conflict {
        id:       IncidentId,
        expected: IncidentStatus,
        actual:   IncidentStatus,
    },

    #[error("illegal transition on {id}: {from} -> {to}")]
    InvalidTransition {
        id:   IncidentId,
        from: IncidentStatus,
        to:   IncidentStatus,
    },

    /// `RAISED → ASSIGNED` carries an assignee and must go through
    /// [`Incident::assign`](crate::Incident::assign).
    #[error("{0}: assignment requires a responder")]
    NeedsAssignee(IncidentId),

    #[error("{user} did not report {id}")]
    NotReporter { id: IncidentId, user: UserId },

    #[error("cancel window for {0} has elapsed")]
    GraceExpired(IncidentId),

    #[error("{id} is {status}; only archived or cancelled incidents can be removed")]
    NotTerminal { id: IncidentId, status: IncidentStatus },

    #[error("zone error: {0}")]
    Zone(#[from] ZoneError),
}

pub type IncidentResult<T> = Result<T, IncidentError>;
