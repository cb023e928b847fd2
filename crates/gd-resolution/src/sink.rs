//! The `ArchiveSink` trait and the in-memory sink.

use std::sync::Mutex;

use gd_core::IncidentId;
use gd_zone::lock;

use crate::{ArchiveReceipt, ArchiveRecord, ArchiveResult};

/// Durable storage for finished incidents.
///
/// A returned receipt means the record is stored; the workflow deletes the
/// live incident only after one.  Implementations are shared between
/// threads, so they take `&self` and lock internally.
pub trait ArchiveSink: Send + Sync {
    fn archive(&self, record: &ArchiveRecord) -> ArchiveResult<ArchiveReceipt>;

    /// Flush buffered output.  Idempotent.
    fn finish(&self) -> ArchiveResult<()> {
        Ok(())
    }
}

/// Keeps archived records in process memory.
#[derive(Default)]
pub struct MemoryArchive {
    records: Mutex<Vec<ArchiveRecord>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ArchiveRecord> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArchiveSink for MemoryArchive {
    fn archive(&self, record: &ArchiveRecord) -> ArchiveResult<ArchiveReceipt> {
        let mut records = lock(&self.records);
        records.push(record.clone());
        Ok(ArchiveReceipt {
            incident:  IncidentId(record.incident_id),
            reference: format!("mem:{}", records.len() - 1),
        })
    }
}
