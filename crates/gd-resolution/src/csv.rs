//! CSV archive backend.
//!
//! Appends one row per record to `archive.csv` in the configured directory
//! and flushes before acknowledging.  Reopening an existing archive keeps
//! its rows and continues the row count.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use csv::{Reader, Writer, WriterBuilder};
use gd_core::IncidentId;
use gd_zone::lock;

use crate::sink::ArchiveSink;
use crate::{ArchiveReceipt, ArchiveRecord, ArchiveResult};

pub const ARCHIVE_FILE: &str = "archive.csv";

const HEADER: [&str; 16] = [
    "incident_id",
    "outcome",
    "reporter_id",
    "department",
    "severity",
    "zone",
    "lat",
    "lng",
    "address",
    "created_at",
    "responder_id",
    "responder_name",
    "assigned_at",
    "resolved_at",
    "archived_at",
    "proof_note",
];

struct Inner {
    writer: Writer<File>,
    rows:   u64,
}

pub struct CsvArchive {
    inner: Mutex<Inner>,
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl CsvArchive {
    /// Open `archive.csv` in `dir` for appending, creating it with a header
    /// row if it does not exist yet.
    pub fn new(dir: &Path) -> ArchiveResult<Self> {
        let path = dir.join(ARCHIVE_FILE);
        let file = OpenOptions::new().append(true).create(true).open(&path)?;
        let fresh = file.metadata()?.len() == 0;

        let rows = if fresh {
            0
        } else {
            Reader::from_path(&path)?.records().count() as u64
        };
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if fresh {
            writer.write_record(HEADER)?;
            writer.flush()?;
        } else {
            log::info!("appending to {} ({rows} rows)", path.display());
        }
        Ok(Self { inner: Mutex::new(Inner { writer, rows }) })
    }
}

impl ArchiveSink for CsvArchive {
    fn archive(&self, r: &ArchiveRecord) -> ArchiveResult<ArchiveReceipt> {
        let mut inner = lock(&self.inner);
        inner.writer.write_record(&[
            r.incident_id.to_string(),
            r.outcome.to_string(),
            r.reporter_id.to_string(),
            r.department.clone(),
            r.severity.clone(),
            r.zone.clone(),
            r.lat.to_string(),
            r.lng.to_string(),
            r.address.clone(),
            r.created_at.to_string(),
            opt(&r.responder_id),
            opt(&r.responder_name),
            opt(&r.assigned_at),
            opt(&r.resolved_at),
            r.archived_at.to_string(),
            opt(&r.proof_note),
        ])?;
        inner.writer.flush()?;
        inner.rows += 1;
        Ok(ArchiveReceipt {
            incident:  IncidentId(r.incident_id),
            reference: format!("{ARCHIVE_FILE}:{}", inner.rows),
        })
    }

    fn finish(&self) -> ArchiveResult<()> {
        lock(&self.inner).writer.flush()?;
        Ok(())
    }
}
