use gd_core::UserId;
use gd_zone::ZoneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("{0} has no active threat marker")]
    MarkerNotFound(UserId),

    #[error("zone error: {0}")]
    Zone(#[from] ZoneError),
}

pub type BroadcastResult<T> = Result<T, BroadcastError>;
