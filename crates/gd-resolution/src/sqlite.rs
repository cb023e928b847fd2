//! SQLite archive backend (feature `sqlite`).
//!
//! One `archive.db` file.  Every `SqliteArchive` opened on it registers a
//! new row in `runs`; `archive` rows are keyed by `(run_id, incident_id)`,
//! since incident ids start again from zero in every process.

use std::path::Path;
use std::sync::Mutex;

use gd_core::IncidentId;
use gd_zone::lock;
use rusqlite::Connection;

use crate::sink::ArchiveSink;
use crate::{ArchiveReceipt, ArchiveRecord, ArchiveResult};

pub struct SqliteArchive {
    conn:   Mutex<Connection>,
    run_id: i64,
}

impl SqliteArchive {
    /// Open (or create) `archive.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> ArchiveResult<Self> {
        Self::from_connection(Connection::open(dir.join("archive.db"))?)
    }

    pub fn from_connection(conn: Connection) -> ArchiveResult<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS runs (
                 run_id    INTEGER PRIMARY KEY AUTOINCREMENT,
                 opened_at INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS archive (
                 run_id         INTEGER NOT NULL REFERENCES runs(run_id),
                 incident_id    INTEGER NOT NULL,
                 outcome        TEXT    NOT NULL,
                 reporter_id    INTEGER NOT NULL,
                 department     TEXT    NOT NULL,
                 severity       TEXT    NOT NULL,
                 zone           TEXT    NOT NULL,
                 lat            REAL    NOT NULL,
                 lng            REAL    NOT NULL,
                 address        TEXT    NOT NULL,
                 created_at     INTEGER NOT NULL,
                 responder_id   INTEGER,
                 responder_name TEXT,
                 assigned_at    INTEGER,
                 resolved_at    INTEGER,
                 archived_at    INTEGER NOT NULL,
                 proof_note     TEXT,
                 PRIMARY KEY (run_id, incident_id)
             );",
        )?;
        conn.execute("INSERT INTO runs (opened_at) VALUES (strftime('%s', 'now'))", [])?;
        let run_id = conn.last_insert_rowid();
        log::debug!("archive run {run_id} opened");
        Ok(Self { conn: Mutex::new(conn), run_id })
    }

    /// Identifies this process's rows in the shared `archive` table.
    pub fn run_id(&self) -> i64 {
        self.run_id
    }
}

impl ArchiveSink for SqliteArchive {
    /// Re-archiving an incident within the same run replaces its row, so a
    /// retry after an ambiguous failure is harmless.  Rows of earlier runs
    /// are never touched.
    fn archive(&self, r: &ArchiveRecord) -> ArchiveResult<ArchiveReceipt> {
        let conn = lock(&self.conn);
        conn.execute(
            "INSERT OR REPLACE INTO archive \
             (run_id, incident_id, outcome, reporter_id, department, severity, zone, lat, lng, address, \
              created_at, responder_id, responder_name, assigned_at, resolved_at, archived_at, proof_note) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            rusqlite::params![
                self.run_id,
                r.incident_id,
                r.outcome.as_str(),
                r.reporter_id,
                r.department,
                r.severity,
                r.zone,
                r.lat,
                r.lng,
                r.address,
                r.created_at as i64,
                r.responder_id,
                r.responder_name,
                r.assigned_at.map(|t| t as i64),
                r.resolved_at.map(|t| t as i64),
                r.archived_at as i64,
                r.proof_note,
            ],
        )?;
        Ok(ArchiveReceipt {
            incident:  IncidentId(r.incident_id),
            reference: format!("archive.db:{}:{}", self.run_id, r.incident_id),
        })
    }

    fn finish(&self) -> ArchiveResult<()> {
        lock(&self.conn).execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
