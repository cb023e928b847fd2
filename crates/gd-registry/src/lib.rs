//! `gd-registry` — live roster of field units.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`unit`]     | `ResponderUnit`, `ResponderStatus`, `Heartbeat`              |
//! | [`registry`] | `ResponderRegistry` — zone rosters, presence expiry, history |
//! | [`feed`]     | `PositionUpdate`, `PositionSubscription`                     |
//! | [`error`]    | `RegistryError`, `RegistryResult<T>`                         |
//!
//! # Status invariant
//!
//! A unit is `Engaged` exactly when it holds a current task.  Both fields are
//! private to [`ResponderUnit`] and only change through
//! [`ResponderUnit::engage`] / [`ResponderUnit::release`], which check the
//! expected prior state.  Nothing can overwrite them unconditionally.

pub mod error;
pub mod feed;
pub mod registry;
pub mod unit;


pub use error::{RegistryError, RegistryResult};
pub use feed::{PositionSubscription, PositionUpdate};
pub use registry::ResponderRegistry;
pub use unit::{Heartbeat, ResponderStatus, ResponderUnit};
