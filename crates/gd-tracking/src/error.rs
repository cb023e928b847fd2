use gd_core::{IncidentId, ResponderId};
use gd_incident::IncidentStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("incident {0} not found")]
    IncidentNotFound(IncidentId),

    #[error("{id} is {status}, not COMMUTING")]
    NotCommuting { id: IncidentId, status: IncidentStatus },

    #[error("{0} has no assigned responder")]
    NoAssignee(IncidentId),

    #[error("responder {0} is not connected")]
    ResponderNotFound(ResponderId),

    #[error("{0} is not being tracked")]
    NotTracking(IncidentId),

    #[error("directions unavailable: {0}")]
    Directions(String),
}

pub type TrackingResult<T> = Result<T, TrackingError>;
