//! `gd-tracking` — following an assigned unit to its incident.
//!
//! # Crate layout
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`detector`]   | `ArrivalDetector`, `TrackingSignal`                    |
//! | [`tracker`]    | `Tracker`, `TrackingSession`                           |
//! | [`directions`] | `DirectionsProvider`, `StraightLineDirections`, `RouteEstimate` |
//! | [`error`]      | `TrackingError`, `TrackingResult<T>`                   |
//!
//! Signals are advisory.  Nothing here changes incident or unit state; a
//! lost signal never fails an operation.

pub mod detector;
pub mod directions;
pub mod error;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use detector::{ArrivalDetector, TrackingSignal};
pub use directions::{DirectionsProvider, RouteEstimate, StraightLineDirections};
pub use error::{TrackingError, TrackingResult};
pub use tracker::{Tracker, TrackingSession};
