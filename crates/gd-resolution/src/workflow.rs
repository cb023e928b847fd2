//! `ResolutionWorkflow` — completion, confirmation, rejection, archival.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use gd_core::{DispatchConfig, IncidentId, ResponderId, Tick, UserId};
use gd_incident::{Incident, IncidentError, IncidentStatus, IncidentStore};
use gd_registry::ResponderRegistry;
use gd_zone::lock;

use crate::record::{ArchiveOutcome, ArchiveReceipt, ArchiveRecord};
use crate::sink::ArchiveSink;
use crate::verify::{CompletionProof, Verdict, Verifier};
use crate::{ResolutionError, ResolutionResult};

/// Marks an incident as being closed; cleared on drop.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<IncidentId>>,
    id:  IncidentId,
}

impl<'a> InFlight<'a> {
    fn claim(set: &'a Mutex<HashSet<IncidentId>>, id: IncidentId) -> ResolutionResult<Self> {
        if !lock(set).insert(id) {
            return Err(ResolutionError::InProgress(id));
        }
        Ok(Self { set, id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.id);
    }
}

pub struct ResolutionWorkflow {
    incidents:    Arc<IncidentStore>,
    registry:     Arc<ResponderRegistry>,
    sink:         Arc<dyn ArchiveSink>,
    verifier:     Arc<dyn Verifier>,
    arrival_m:    f64,
    max_attempts: u32,
    in_flight:    Mutex<HashSet<IncidentId>>,
    /// Proof accepted at completion, kept until archive.
    proofs:       Mutex<HashMap<IncidentId, CompletionProof>>,
}

impl ResolutionWorkflow {
    pub fn new(
        incidents: Arc<IncidentStore>,
        registry:  Arc<ResponderRegistry>,
        sink:      Arc<dyn ArchiveSink>,
        verifier:  Arc<dyn Verifier>,
        config:    &DispatchConfig,
    ) -> Self {
        Self {
            incidents,
            registry,
            sink,
            verifier,
            arrival_m:    config.arrival_threshold_m,
            max_attempts: config.archive_max_attempts.max(1),
            in_flight:    Mutex::new(HashSet::new()),
            proofs:       Mutex::new(HashMap::new()),
        }
    }

    pub fn sink(&self) -> &Arc<dyn ArchiveSink> {
        &self.sink
    }

    fn snapshot(&self, id: IncidentId) -> ResolutionResult<Incident> {
        self.incidents.get(id).ok_or(ResolutionError::IncidentNotFound(id))
    }

    // ── Responder side ────────────────────────────────────────────────────

    /// `COMMUTING → RESOLVED` on the assigned unit's say-so.
    ///
    /// The unit must be within the arrival threshold of the incident and the
    /// verifier must accept the proof.
    pub fn submit_completion(
        &self,
        id:    IncidentId,
        proof: CompletionProof,
        now:   Tick,
    ) -> ResolutionResult<Incident> {
        let inc = self.snapshot(id)?;
        let responder = proof.responder;
        if inc.assigned_to() != Some(responder) {
            return Err(ResolutionError::NotAssignee { incident: id, responder });
        }
        if inc.status() != IncidentStatus::Commuting {
            return Err(IncidentError::Conflict {
                id,
                expected: IncidentStatus::Commuting,
                actual:   inc.status(),
            }
            .into());
        }

        let unit = self.registry.get(responder).ok_or(ResolutionError::ResponderNotFound(responder))?;
        let distance_m = inc.position.distance_m(unit.position);
        if distance_m > self.arrival_m {
            log::warn!("{id}: completion from {distance_m:.0} m refused");
            return Err(ResolutionError::TooFar { incident: id, distance_m, threshold_m: self.arrival_m });
        }

        if let Verdict::Rejected(reason) = self.verifier.verify(&inc, &proof) {
            log::warn!("{id}: proof rejected: {reason}");
            return Err(ResolutionError::ProofRejected { incident: id, reason });
        }

        let resolved = self.incidents.compare_and_transition(
            id,
            IncidentStatus::Commuting,
            IncidentStatus::Resolved,
            now,
        )?;
        lock(&self.proofs).insert(id, proof);
        log::info!("{id} resolved by {responder}, awaiting confirmation");
        Ok(resolved)
    }

    // ── Reporter side ─────────────────────────────────────────────────────

    /// Reporter accepts the resolution: archive, then delete, then release.
    ///
    /// On archive failure (after `archive_max_attempts` tries) nothing is
    /// changed and [`ResolutionError::ArchiveFailed`] is returned.
    pub fn confirm(&self, id: IncidentId, reporter: UserId, now: Tick) -> ResolutionResult<ArchiveReceipt> {
        let _claim = InFlight::claim(&self.in_flight, id)?;
        let inc = self.snapshot(id)?;
        if inc.reporter != reporter {
            return Err(ResolutionError::NotReporter { incident: id, user: reporter });
        }
        if inc.status() != IncidentStatus::Resolved {
            return Err(IncidentError::Conflict {
                id,
                expected: IncidentStatus::Resolved,
                actual:   inc.status(),
            }
            .into());
        }
        let responder = inc.assigned_to().ok_or(IncidentError::NeedsAssignee(id))?;

        let record = {
            let proofs = lock(&self.proofs);
            ArchiveRecord::new(&inc, ArchiveOutcome::Resolved, proofs.get(&id), now)
        };
        let receipt = self.archive_with_retry(&record)?;

        self.incidents.compare_and_transition(id, IncidentStatus::Resolved, IncidentStatus::Archived, now)?;
        self.incidents.remove_archived(id)?;
        lock(&self.proofs).remove(&id);
        self.release(responder, id);

        log::info!("{id} archived as {}", receipt.reference);
        Ok(receipt)
    }

    /// Reporter disputes the resolution: back to `COMMUTING`, unit stays engaged.
    pub fn reject(&self, id: IncidentId, reporter: UserId, now: Tick) -> ResolutionResult<Incident> {
        let _claim = InFlight::claim(&self.in_flight, id)?;
        let inc = self.snapshot(id)?;
        if inc.reporter != reporter {
            return Err(ResolutionError::NotReporter { incident: id, user: reporter });
        }
        let reopened = self.incidents.compare_and_transition(
            id,
            IncidentStatus::Resolved,
            IncidentStatus::Commuting,
            now,
        )?;
        lock(&self.proofs).remove(&id);
        log::info!("{id} rejected by reporter, back to COMMUTING");
        Ok(reopened)
    }

    /// Archive and remove a `CANCELLED` incident.
    pub fn archive_cancelled(&self, id: IncidentId, now: Tick) -> ResolutionResult<ArchiveReceipt> {
        let _claim = InFlight::claim(&self.in_flight, id)?;
        let inc = self.snapshot(id)?;
        if inc.status() != IncidentStatus::Cancelled {
            return Err(IncidentError::Conflict {
                id,
                expected: IncidentStatus::Cancelled,
                actual:   inc.status(),
            }
            .into());
        }
        let record = ArchiveRecord::new(&inc, ArchiveOutcome::Cancelled, None, now);
        let receipt = self.archive_with_retry(&record)?;
        self.incidents.remove_archived(id)?;
        log::info!("{id} (cancelled) archived as {}", receipt.reference);
        Ok(receipt)
    }

    fn archive_with_retry(&self, record: &ArchiveRecord) -> ResolutionResult<ArchiveReceipt> {
        let incident = IncidentId(record.incident_id);
        let mut attempt = 1;
        loop {
            match self.sink.archive(record) {
                Ok(receipt) => return Ok(receipt),
                Err(e) if attempt >= self.max_attempts => {
                    log::warn!("{incident}: archive failed {attempt} time(s), giving up: {e}");
                    return Err(ResolutionError::ArchiveFailed { incident, attempts: attempt, last: e });
                }
                Err(e) => {
                    log::warn!("{incident}: archive attempt {attempt} failed, retrying: {e}");
                    attempt += 1;
                }
            }
        }
    }

    /// Free the unit and record the completion.  The incident is already
    /// gone, so a failure here is logged, not returned.
    fn release(&self, responder: ResponderId, id: IncidentId) {
        match self.registry.release(responder, id) {
            Ok(()) => self.registry.record_completion(responder, id),
            Err(e) => log::warn!("{id}: could not release {responder}: {e}"),
        }
    }

    pub fn pending_proof(&self, id: IncidentId) -> Option<CompletionProof> {
        lock(&self.proofs).get(&id).cloned()
    }
}
