//! `gd-broadcast` — SOS threat markers and proximity lookup.
//!
//! # Crate layout
//!
//! | Module     | Contents                                         |
//! |------------|--------------------------------------------------|
//! | [`marker`] | `ThreatMarker`, `NearbyThreat`                   |
//! | [`board`]  | `ThreatBoard` — fine-zone marker table           |
//! | [`error`]  | `BroadcastError`, `BroadcastResult<T>`           |
//!
//! # Lookup model
//!
//! Markers are bucketed at the fine threat precision (6 characters by
//! default, roughly 1.2 km × 0.6 km).  An observer sees the markers in its
//! own bucket within the threat radius, never its own.  With
//! [`ThreatBoard::with_neighbors`] the eight surrounding buckets are scanned
//! too, so a marker just across a cell edge is not missed.

pub mod board;
pub mod error;
pub mod marker;

#[cfg(test)]
mod tests;

pub use board::ThreatBoard;
pub use error::{BroadcastError, BroadcastResult};
pub use marker::{NearbyThreat, ThreatMarker};
