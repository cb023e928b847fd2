//! `gd-resolution` — closing incidents without losing them.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`verify`]   | `CompletionProof`, `Verifier`, `Verdict`, `AcceptAll`     |
//! | [`record`]   | `ArchiveRecord`, `ArchiveOutcome`, `ArchiveReceipt`       |
//! | [`sink`]     | `ArchiveSink` trait, `MemoryArchive`                      |
//! | [`csv`]      | `CsvArchive`                                              |
//! | [`sqlite`]   | `SqliteArchive` (feature `sqlite`)                        |
//! | [`workflow`] | `ResolutionWorkflow`                                      |
//! | [`error`]    | `ResolutionError`, `ArchiveError`                         |
//!
//! # Archive before delete
//!
//! The live incident is only removed after an [`ArchiveSink`] has returned a
//! receipt for it.  A failed archive leaves every live record exactly as it
//! was, so the caller can retry.
//!
//! # Feature flags
//!
//! | Flag     | Effect                                         |
//! |----------|------------------------------------------------|
//! | `sqlite` | Enables [`SqliteArchive`] via `rusqlite`.      |
//! | `serde`  | Serialize/Deserialize on records and proofs.   |

pub mod csv;
pub mod error;
pub mod record;
pub mod sink;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod verify;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use csv::CsvArchive;
pub use error::{ArchiveError, ArchiveResult, ResolutionError, ResolutionResult};
pub use record::{ArchiveOutcome, ArchiveReceipt, ArchiveRecord};
pub use sink::{ArchiveSink, MemoryArchive};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteArchive;
pub use verify::{AcceptAll, CompletionProof, Verdict, Verifier};
pub use workflow::ResolutionWorkflow;
