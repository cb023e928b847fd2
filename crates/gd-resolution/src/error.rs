//! Error types for gd-resolution.

use gd_core::{IncidentId, ResponderId, UserId};
use gd_incident::IncidentError;
use gd_registry::RegistryError;
use thiserror::Error;

/// Failures of a single archive write.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] ::csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("archive rejected the record: {0}")]
    Rejected(String),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("incident {0} not found")]
    IncidentNotFound(IncidentId),

    #[error("responder {0} is not connected")]
    ResponderNotFound(ResponderId),

    #[error("{responder} is not assigned to {incident}")]
    NotAssignee { incident: IncidentId, responder: ResponderId },

    #[error("{user} did not report {incident}")]
    NotReporter { incident: IncidentId, user: UserId },

    #[error("{incident}: unit is {distance_m:.0} m away, must be within {threshold_m:.0} m")]
    TooFar { incident: IncidentId, distance_m: f64, threshold_m: f64 },

    #[error("{incident}: completion proof rejected: {reason}")]
    ProofRejected { incident: IncidentId, reason: String },

    /// Every attempt failed; live records are untouched.  Retry later.
    #[error("{incident}: archive failed after {attempts} attempt(s): {last}")]
    ArchiveFailed { incident: IncidentId, attempts: u32, last: ArchiveError },

    #[error("{0} is already being resolved")]
    InProgress(IncidentId),

    #[error("incident error: {0}")]
    Incident(#[from] IncidentError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;
