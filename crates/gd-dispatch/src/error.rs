use gd_core::{Department, IncidentId, ResponderId};
use gd_incident::IncidentError;
use gd_registry::RegistryError;
use gd_zone::ZoneKey;
use thiserror::Error;

/// Dispatch failures.
///
/// "No unit available" and "lost the race" are normal outcomes, reported
/// through [`DispatchOutcome`](crate::DispatchOutcome), never here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("incident {0} not found")]
    IncidentNotFound(IncidentId),

    #[error("responder {0} not found")]
    ResponderNotFound(ResponderId),

    #[error("{responder} is in zone {responder_zone}, {incident} is in {incident_zone}")]
    ZoneMismatch {
        incident:       IncidentId,
        incident_zone:  ZoneKey,
        responder:      ResponderId,
        responder_zone: ZoneKey,
    },

    #[error("{responder} serves {responder_dept}, {incident} needs {incident_dept}")]
    DepartmentMismatch {
        incident:       IncidentId,
        incident_dept:  Department,
        responder:      ResponderId,
        responder_dept: Department,
    },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("incident error: {0}")]
    Incident(#[from] IncidentError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
