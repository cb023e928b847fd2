//! Zone-subsystem error type.

use thiserror::Error;

use gd_core::CoreError;

/// Errors produced by `gd-zone`.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("precision {0} outside 1..=12")]
    InvalidPrecision(u8),

    #[error("`{0}` is not a valid zone key")]
    InvalidKey(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ZoneResult<T> = Result<T, ZoneError>;
