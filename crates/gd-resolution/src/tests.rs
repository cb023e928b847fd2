//! Unit tests for gd-resolution.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use gd_core::{Coordinate, Department, DispatchConfig, IncidentId, ResponderId, Tick, UserId};
    use gd_incident::{IncidentStore, NewIncident, Severity};
    use gd_registry::{Heartbeat, ResponderRegistry};

    use crate::{
        AcceptAll, ArchiveError, ArchiveReceipt, ArchiveRecord, ArchiveResult, ArchiveSink,
        CompletionProof, MemoryArchive, ResolutionWorkflow, Verdict, Verifier,
    };

    pub const SCENE: (f64, f64) = (37.7520, -122.4280);

    pub fn c(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    /// Fails the first `failures` calls, then delegates to memory.
    pub struct FlakyArchive {
        pub failures: AtomicU32,
        pub calls:    AtomicU32,
        pub inner:    MemoryArchive,
    }

    impl FlakyArchive {
        pub fn failing(n: u32) -> Self {
            Self { failures: AtomicU32::new(n), calls: AtomicU32::new(0), inner: MemoryArchive::new() }
        }
    }

    impl ArchiveSink for FlakyArchive {
        fn archive(&self, record: &ArchiveRecord) -> ArchiveResult<ArchiveReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(ArchiveError::Rejected("storage unavailable".into()));
            }
            self.inner.archive(record)
        }
    }

    pub struct RequireEvidence;

    impl Verifier for RequireEvidence {
        fn verify(&self, _: &gd_incident::Incident, proof: &CompletionProof) -> Verdict {
            if proof.evidence.is_empty() {
                Verdict::Rejected("no photo attached".into())
            } else {
                Verdict::Accepted
            }
        }
    }

    pub struct World {
        pub registry:  Arc<ResponderRegistry>,
        pub incidents: Arc<IncidentStore>,
        pub workflow:  ResolutionWorkflow,
    }

    impl World {
        pub fn with(sink: Arc<dyn ArchiveSink>, verifier: Arc<dyn Verifier>) -> Self {
            let registry = Arc::new(ResponderRegistry::default());
            let incidents = Arc::new(IncidentStore::default());
            let workflow = ResolutionWorkflow::new(
                Arc::clone(&incidents),
                Arc::clone(&registry),
                sink,
                verifier,
                &DispatchConfig::default(),
            );
            Self { registry, incidents, workflow }
        }

        pub fn new(sink: Arc<dyn ArchiveSink>) -> Self {
            Self::with(sink, Arc::new(AcceptAll))
        }

        pub fn beat(&self, lat: f64, lng: f64, now: Tick) {
            self.registry
                .heartbeat(
                    Heartbeat {
                        responder:  ResponderId(1),
                        name:       "Crew 1".into(),
                        department: Department::Water,
                        position:   c(lat, lng),
                    },
                    now,
                )
                .unwrap();
        }

        /// Commuting incident reported by user 7 with unit 1 `lat_offset`
        /// degrees north of the scene.
        pub fn commuting(&self, lat_offset: f64) -> IncidentId {
            self.beat(SCENE.0 + lat_offset, SCENE.1, Tick(0));
            let inc = self
                .incidents
                .raise(
                    NewIncident {
                        reporter:   UserId(7),
                        department: Department::Water,
                        severity:   Severity::Medium,
                        position:   c(SCENE.0, SCENE.1),
                        address:    "Burst main, 24th St".into(),
                    },
                    Tick(0),
                )
                .unwrap();
            {
                let ih = self.incidents.handle(inc.id).unwrap();
                let uh = self.registry.handle(ResponderId(1)).unwrap();
                let mut i = ih.lock().unwrap();
                let mut u = uh.lock().unwrap();
                u.engage(inc.id).unwrap();
                i.assign(u.id, &u.name, Tick(1)).unwrap();
            }
            self.incidents.start_commute(inc.id).unwrap();
            inc.id
        }

        pub fn proof(&self) -> CompletionProof {
            CompletionProof {
                responder: ResponderId(1),
                note:      "valve replaced".into(),
                evidence:  vec!["photo-1".into()],
            }
        }
    }
}

// ── Completion ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod completion {
    use std::sync::Arc;

    use gd_core::{ResponderId, Tick};
    use gd_incident::{IncidentError, IncidentStatus};

    use super::helpers::{RequireEvidence, World};
    use crate::{MemoryArchive, ResolutionError};

    #[test]
    fn on_scene_completion_resolves() {
        let w = World::new(Arc::new(MemoryArchive::new()));
        let inc = w.commuting(0.0002);
        let r = w.workflow.submit_completion(inc, w.proof(), Tick(20)).unwrap();
        assert_eq!(r.status(), IncidentStatus::Resolved);
        assert_eq!(r.resolved_at(), Some(Tick(20)));
        assert_eq!(w.workflow.pending_proof(inc).unwrap().note, "valve replaced");
    }

    #[test]
    fn far_away_completion_is_refused() {
        let w = World::new(Arc::new(MemoryArchive::new()));
        // ~100 m out.
        let inc = w.commuting(0.0009);
        let err = w.workflow.submit_completion(inc, w.proof(), Tick(20)).unwrap_err();
        assert!(matches!(err, ResolutionError::TooFar { distance_m, .. } if distance_m > 50.0));
        assert_eq!(w.incidents.get(inc).unwrap().status(), IncidentStatus::Commuting);
    }

    #[test]
    fn only_the_assignee_may_complete() {
        let w = World::new(Arc::new(MemoryArchive::new()));
        let inc = w.commuting(0.0);
        let mut proof = w.proof();
        proof.responder = ResponderId(2);
        assert!(matches!(
            w.workflow.submit_completion(inc, proof, Tick(1)),
            Err(ResolutionError::NotAssignee { .. })
        ));
    }

    #[test]
    fn verifier_gates_resolution() {
        let w = World::with(Arc::new(MemoryArchive::new()), Arc::new(RequireEvidence));
        let inc = w.commuting(0.0);
        let mut proof = w.proof();
        proof.evidence.clear();
        assert!(matches!(
            w.workflow.submit_completion(inc, proof, Tick(1)),
            Err(ResolutionError::ProofRejected { .. })
        ));
        assert!(w.workflow.submit_completion(inc, w.proof(), Tick(2)).is_ok());
    }

    #[test]
    fn completion_twice_is_a_conflict() {
        let w = World::new(Arc::new(MemoryArchive::new()));
        let inc = w.commuting(0.0);
        w.workflow.submit_completion(inc, w.proof(), Tick(1)).unwrap();
        let err = w.workflow.submit_completion(inc, w.proof(), Tick(2)).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::Incident(IncidentError::Conflict { actual: IncidentStatus::Resolved, .. })
        ));
    }
}

// ── Confirmation & archive ────────────────────────────────────────────────────

#[cfg(test)]
mod confirm {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use gd_core::{ResponderId, Tick, UserId};
    use gd_incident::IncidentStatus;
    use gd_registry::ResponderStatus;

    use super::helpers::{FlakyArchive, World};
    use crate::{ArchiveOutcome, MemoryArchive, ResolutionError};

    #[test]
    fn archive_then_delete_then_release() {
        let sink = Arc::new(MemoryArchive::new());
        let w = World::new(sink.clone());
        let inc = w.commuting(0.0);
        w.workflow.submit_completion(inc, w.proof(), Tick(5)).unwrap();

        let receipt = w.workflow.confirm(inc, UserId(7), Tick(6)).unwrap();
        assert_eq!(receipt.incident, inc);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, ArchiveOutcome::Resolved);
        assert_eq!(records[0].responder_id, Some(1));
        assert_eq!(records[0].resolved_at, Some(5));
        assert_eq!(records[0].proof_note.as_deref(), Some("valve replaced"));

        assert!(w.incidents.get(inc).is_none());
        assert!(w.incidents.active_for_reporter(UserId(7)).is_empty());
        let unit = w.registry.get(ResponderId(1)).unwrap();
        assert_eq!(unit.status(), ResponderStatus::Available);
        assert_eq!(unit.current_task(), None);
        assert_eq!(w.registry.history(ResponderId(1)), [inc]);
        assert!(w.workflow.pending_proof(inc).is_none());
    }

    #[test]
    fn failed_archive_leaves_live_record() {
        let sink = Arc::new(FlakyArchive::failing(u32::MAX));
        let w = World::new(sink.clone());
        let inc = w.commuting(0.0);
        w.workflow.submit_completion(inc, w.proof(), Tick(5)).unwrap();

        let err = w.workflow.confirm(inc, UserId(7), Tick(6)).unwrap_err();
        assert!(matches!(err, ResolutionError::ArchiveFailed { attempts: 3, .. }));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);

        let live = w.incidents.get(inc).unwrap();
        assert_eq!(live.status(), IncidentStatus::Resolved);
        assert_eq!(live.assigned_to(), Some(ResponderId(1)));
        assert_eq!(w.registry.get(ResponderId(1)).unwrap().current_task(), Some(inc));
    }

    #[test]
    fn transient_failures_are_retried() {
        let sink = Arc::new(FlakyArchive::failing(2));
        let w = World::new(sink.clone());
        let inc = w.commuting(0.0);
        w.workflow.submit_completion(inc, w.proof(), Tick(5)).unwrap();
        w.workflow.confirm(inc, UserId(7), Tick(6)).unwrap();
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
        assert_eq!(sink.inner.len(), 1);
        assert!(w.incidents.get(inc).is_none());
    }

    #[test]
    fn retry_after_outage_succeeds() {
        let sink = Arc::new(FlakyArchive::failing(3));
        let w = World::new(sink.clone());
        let inc = w.commuting(0.0);
        w.workflow.submit_completion(inc, w.proof(), Tick(5)).unwrap();
        assert!(w.workflow.confirm(inc, UserId(7), Tick(6)).is_err());
        assert!(w.workflow.confirm(inc, UserId(7), Tick(7)).is_ok());
        assert_eq!(sink.inner.len(), 1);
    }

    #[test]
    fn only_reporter_confirms_resolved() {
        let w = World::new(Arc::new(MemoryArchive::new()));
        let inc = w.commuting(0.0);
        assert!(matches!(
            w.workflow.confirm(inc, UserId(7), Tick(1)),
            Err(ResolutionError::Incident(_))
        ));
        w.workflow.submit_completion(inc, w.proof(), Tick(2)).unwrap();
        assert!(matches!(
            w.workflow.confirm(inc, UserId(8), Tick(3)),
            Err(ResolutionError::NotReporter { .. })
        ));
    }

    #[test]
    fn rejection_reopens_and_keeps_unit() {
        let w = World::new(Arc::new(MemoryArchive::new()));
        let inc = w.commuting(0.0);
        w.workflow.submit_completion(inc, w.proof(), Tick(2)).unwrap();

        let back = w.workflow.reject(inc, UserId(7), Tick(3)).unwrap();
        assert_eq!(back.status(), IncidentStatus::Commuting);
        assert_eq!(back.resolved_at(), None);
        assert_eq!(w.registry.get(ResponderId(1)).unwrap().current_task(), Some(inc));

        // Can be completed again afterwards.
        w.workflow.submit_completion(inc, w.proof(), Tick(4)).unwrap();
        assert!(w.workflow.confirm(inc, UserId(7), Tick(5)).is_ok());
    }
}

// ── Cancelled ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cancelled {
    use std::sync::Arc;

    use gd_core::{Department, Tick, UserId};
    use gd_incident::{NewIncident, Severity};

    use super::helpers::{FlakyArchive, SCENE, World, c};
    use crate::{ArchiveOutcome, MemoryArchive};

    fn raise(w: &World) -> gd_core::IncidentId {
        w.incidents
            .raise(
                NewIncident {
                    reporter:   UserId(3),
                    department: Department::Fire,
                    severity:   Severity::Critical,
                    position:   c(SCENE.0, SCENE.1),
                    address:    String::new(),
                },
                Tick(0),
            )
            .unwrap()
            .id
    }

    #[test]
    fn cancelled_is_archived_then_removed() {
        let sink = Arc::new(MemoryArchive::new());
        let w = World::new(sink.clone());
        let id = raise(&w);
        assert!(w.workflow.archive_cancelled(id, Tick(1)).is_err());

        w.incidents.cancel(id, UserId(3), Tick(2), 3).unwrap();
        w.workflow.archive_cancelled(id, Tick(2)).unwrap();
        assert!(w.incidents.get(id).is_none());
        let rec = &sink.records()[0];
        assert_eq!(rec.outcome, ArchiveOutcome::Cancelled);
        assert_eq!(rec.responder_id, None);
    }

    #[test]
    fn cancelled_survives_archive_failure() {
        let w = World::new(Arc::new(FlakyArchive::failing(10)));
        let id = raise(&w);
        w.incidents.cancel(id, UserId(3), Tick(1), 3).unwrap();
        assert!(w.workflow.archive_cancelled(id, Tick(1)).is_err());
        assert!(w.incidents.get(id).is_some());
    }
}

// ── Backends ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod backends {
    use std::sync::Arc;

    use gd_core::{Tick, UserId};
    use tempfile::TempDir;

    use super::helpers::World;
    use crate::csv::ARCHIVE_FILE;
    use crate::{ArchiveOutcome, ArchiveRecord, ArchiveSink, CsvArchive};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn record(incident_id: u32) -> ArchiveRecord {
        ArchiveRecord {
            incident_id,
            outcome:        ArchiveOutcome::Cancelled,
            reporter_id:    9,
            department:     "fire".into(),
            severity:       "critical".into(),
            zone:           "9q8yy".into(),
            lat:            37.75,
            lng:            -122.42,
            address:        String::new(),
            created_at:     0,
            responder_id:   None,
            responder_name: None,
            assigned_at:    None,
            resolved_at:    None,
            archived_at:    3,
            proof_note:     None,
        }
    }

    #[test]
    fn csv_header_and_rows() {
        let dir = tmp();
        let sink = Arc::new(CsvArchive::new(dir.path()).unwrap());
        let w = World::new(sink.clone());
        let inc = w.commuting(0.0);
        w.workflow.submit_completion(inc, w.proof(), Tick(5)).unwrap();
        let receipt = w.workflow.confirm(inc, UserId(7), Tick(6)).unwrap();
        assert_eq!(receipt.reference, format!("{ARCHIVE_FILE}:1"));
        sink.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(ARCHIVE_FILE)).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[0], "incident_id");
        assert_eq!(headers.len(), 16);
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "resolved");
        assert_eq!(&rows[0][3], "water");
        assert_eq!(&rows[0][11], "Crew 1");
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_rows_and_idempotent_retry() {
        use crate::SqliteArchive;

        let dir = tmp();
        let sink = SqliteArchive::new(dir.path()).unwrap();
        let rec = record(4);
        sink.archive(&rec).unwrap();
        sink.archive(&rec).unwrap();
        sink.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("archive.db")).unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM archive", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn csv_reopen_appends() {
        let dir = tmp();
        let rec = record(0);
        {
            let sink = CsvArchive::new(dir.path()).unwrap();
            sink.archive(&rec).unwrap();
            sink.finish().unwrap();
        }
        let sink = CsvArchive::new(dir.path()).unwrap();
        // Incident ids restart in a new process.
        let receipt = sink.archive(&rec).unwrap();
        assert_eq!(receipt.reference, format!("{ARCHIVE_FILE}:2"));
        sink.finish().unwrap();

        let text = std::fs::read_to_string(dir.path().join(ARCHIVE_FILE)).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("incident_id")).count(), 1);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_reopen_keeps_earlier_runs() {
        use crate::SqliteArchive;

        let dir = tmp();
        let first = SqliteArchive::new(dir.path()).unwrap();
        first.archive(&record(0)).unwrap();
        first.finish().unwrap();
        let first_run = first.run_id();
        drop(first);

        let second = SqliteArchive::new(dir.path()).unwrap();
        assert_ne!(second.run_id(), first_run);
        let mut later = record(0);
        later.reporter_id = 11;
        let receipt = second.archive(&later).unwrap();
        assert_eq!(receipt.reference, format!("archive.db:{}:0", second.run_id()));
        second.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("archive.db")).unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM archive", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 2);
        let kept: i64 = conn
            .query_row("SELECT reporter_id FROM archive WHERE run_id = ?1", [first_run], |r| r.get(0))
            .unwrap();
        assert_eq!(kept, 9);
    }
}
