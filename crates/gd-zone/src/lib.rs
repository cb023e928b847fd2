//! `gd-zone` — deterministic spatial bucketing and zone-partitioned storage.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`key`]     | `ZoneKey`, `Precision`                                      |
//! | [`geohash`] | `encode`, `decode`, `bounds`, `neighbors`, `CellBounds`     |
//! | [`table`]   | `ZoneTable<K, V>` — per-zone rosters with per-record locks  |
//! | [`error`]   | `ZoneError`, `ZoneResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | Uses `rustc-hash` for the table's internal maps.           |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public types.         |

pub mod error;
pub mod geohash;
pub mod key;
pub mod table;


pub use error::{ZoneError, ZoneResult};
pub use geohash::{CellBounds, bounds, decode, encode, neighbors};
pub use key::{Precision, ZoneKey};
pub use table::{ZoneTable, lock};
