use gd_core::{IncidentId, ResponderId};
use gd_zone::ZoneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("responder {0} is not registered")]
    NotFound(ResponderId),

    #[error("responder {0} is not available")]
    NotAvailable(ResponderId),

    #[error("responder {responder} holds task {held:?}, not {requested}")]
    TaskMismatch {
        responder: ResponderId,
        held:      Option<IncidentId>,
        requested: IncidentId,
    },

    #[error("zone error: {0}")]
    Zone(#[from] ZoneError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
