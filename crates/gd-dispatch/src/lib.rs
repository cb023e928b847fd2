//! `gd-dispatch` — matching incidents to the nearest available unit.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`candidate`]  | `AssignmentAttempt`, `nearest_candidate`                |
//! | [`engine`]     | `DispatchEngine` — try, commit, manual assign, sweep    |
//! | [`window`]     | `ManualWindows` — countdown deadlines per incident      |
//! | [`dispatcher`] | `Dispatcher`, `DispatchTrigger` — the single entry point |
//! | [`error`]      | `DispatchError`, `DispatchResult<T>`                    |
//!
//! # Producers
//!
//! ```text
//! new incident ─┐
//! manual click ─┼──► DispatchTrigger ──► Dispatcher::handle ──► DispatchEngine
//! window expiry ┤
//! sweep timer ──┘
//! ```
//!
//! Event producers and the timer producer feed the same entry point.  There
//! is no coordination between them beyond the conditional commit: whichever
//! attempt commits first wins and the others observe `RaceLost`.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                          |
//! |------------|-------------------------------------------------|
//! | `parallel` | Sweeps zones concurrently on Rayon's pool.      |

pub mod candidate;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod window;


pub use candidate::{AssignmentAttempt, nearest_candidate};
pub use dispatcher::{DispatchTrigger, Dispatcher, TickReport, TriggerOutcome};
pub use engine::{DispatchEngine, DispatchOutcome, SweepReport};
pub use error::{DispatchError, DispatchResult};
pub use window::ManualWindows;
