//! `gd-core` — foundational types for the `geodispatch` engine.
//!
//! This crate is a dependency of every other `gd-*` crate.  It has no `gd-*`
//! dependencies and only `thiserror` externally, plus optional `serde`.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `IncidentId`, `ResponderId`, `UserId`                 |
//! | [`geo`]         | `Coordinate`, haversine `distance_meters`             |
//! | [`time`]        | `Tick`, `Clock`                                       |
//! | [`config`]      | `DispatchConfig`                                      |
//! | [`department`]  | `Department` enum                                     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod department;
pub mod error;
pub mod geo;
pub mod ids;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::DispatchConfig;
pub use department::Department;
pub use error::{CoreError, CoreResult};
pub use geo::{Coordinate, distance_meters};
pub use ids::{IncidentId, ResponderId, UserId};
pub use time::{Clock, Tick};
