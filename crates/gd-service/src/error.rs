use gd_broadcast::BroadcastError;
use gd_core::{CoreError, IncidentId, ResponderId};
use gd_dispatch::DispatchError;
use gd_incident::{Duplicate, IncidentError};
use gd_registry::RegistryError;
use gd_resolution::ResolutionError;
use gd_tracking::TrackingError;
use gd_zone::ZoneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("{responder} is not assigned to {incident}")]
    NotAssignee {
        incident:  IncidentId,
        responder: ResponderId,
    },

    /// Nothing was filed; a live incident of the same department is
    /// already within the duplicate radius.
    #[error("duplicate of {} ({:.1} m away)", .0.existing.id, .0.distance_m)]
    Duplicate(Duplicate),

    #[error("zone error: {0}")]
    Zone(#[from] ZoneError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("incident error: {0}")]
    Incident(#[from] IncidentError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
