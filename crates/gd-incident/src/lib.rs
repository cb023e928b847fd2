//! `gd-incident` — live incidents and their status state machine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`status`]   | `IncidentStatus` and its transition table, `Severity`    |
//! | [`incident`] | `Incident`, `Assignment`, `NewIncident`                  |
//! | [`store`]    | `IncidentStore`, duplicate check, reporter index         |
//! | [`error`]    | `IncidentError`, `IncidentResult<T>`                     |
//!
//! # State machine
//!
//! ```text
//! RAISED ──► ASSIGNED ──► COMMUTING ──► RESOLVED ──► ARCHIVED
//!   │                         ▲             │
//!   ▼                         └─────────────┘  (reporter rejects)
//! CANCELLED
//! ```
//!
//! Every write names the state it expects to find.  A mismatch is a
//! [`IncidentError::Conflict`]; an edge not in the table is an
//! [`IncidentError::InvalidTransition`].  Neither is ever coerced.

pub mod error;
pub mod incident;
pub mod status;
pub mod store;


pub use error::{IncidentError, IncidentResult};
pub use incident::{Assignment, Incident, NewIncident};
pub use status::{IncidentStatus, Severity};
pub use store::{Duplicate, DuplicateRule, Filing, IncidentStore};
