//! `gd-service` — the geodispatch engine as one object.
//!
//! # Crate layout
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`builder`]  | `ServiceBuilder` — config, archive, verifier, maps   |
//! | [`service`]  | `Service` — client commands and the tick loop        |
//! | [`observer`] | `ServiceObserver`, `NoopObserver`, `TickSummary`     |
//! | [`error`]    | `ServiceError`, `ServiceResult<T>`                   |
//!
//! # Two producers, one entry point
//!
//! ```text
//!   client commands ──┐   raise, manual_assign
//!                     ├──► Dispatcher::handle(DispatchTrigger)
//!   run_ticks ────────┘   window expiry, periodic sweep
//! ```
//!
//! Neither producer holds a lock across the other; assignment safety comes
//! from the conditional commit inside the dispatch engine.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the sweep across zones on Rayon's thread pool.    |
//! | `fx-hash`  | FxHash in the zone tables.                             |
//! | `sqlite`   | Enables `gd_resolution::SqliteArchive`.                |
//! | `serde`    | Serialize/Deserialize on every public record type.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use gd_core::DispatchConfig;
//! use gd_service::{NoopObserver, ServiceBuilder};
//!
//! let mut service = ServiceBuilder::new(DispatchConfig::default()).build()?;
//! service.heartbeat(heartbeat)?;
//! let raised = service.raise(new_incident)?;
//! service.run_ticks(120, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod service;


pub use builder::ServiceBuilder;
pub use error::{ServiceError, ServiceResult};
pub use observer::{NoopObserver, ServiceObserver, TickSummary};
pub use service::{Raised, Service};
