//! Flat archive row types.

use gd_core::{IncidentId, Tick};
use gd_incident::Incident;

use crate::CompletionProof;

/// How the incident left the live store.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ArchiveOutcome {
    Resolved,
    Cancelled,
}

impl ArchiveOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveOutcome::Resolved  => "resolved",
            ArchiveOutcome::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ArchiveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One archived incident, flattened for storage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchiveRecord {
    pub incident_id:    u32,
    pub outcome:        ArchiveOutcome,
    pub reporter_id:    u32,
    pub department:     String,
    pub severity:       String,
    pub zone:           String,
    pub lat:            f64,
    pub lng:            f64,
    pub address:        String,
    pub created_at:     u64,
    /// `None` for incidents cancelled before assignment.
    pub responder_id:   Option<u32>,
    pub responder_name: Option<String>,
    pub assigned_at:    Option<u64>,
    pub resolved_at:    Option<u64>,
    pub archived_at:    u64,
    pub proof_note:     Option<String>,
}

impl ArchiveRecord {
    pub fn new(
        incident: &Incident,
        outcome:  ArchiveOutcome,
        proof:    Option<&CompletionProof>,
        now:      Tick,
    ) -> Self {
        let assignment = incident.assignment();
        Self {
            incident_id:    incident.id.0,
            outcome,
            reporter_id:    incident.reporter.0,
            department:     incident.department.to_string(),
            severity:       incident.severity.to_string(),
            zone:           incident.zone.to_string(),
            lat:            incident.position.lat,
            lng:            incident.position.lng,
            address:        incident.address.clone(),
            created_at:     incident.created_at.0,
            responder_id:   assignment.map(|a| a.responder.0),
            responder_name: assignment.map(|a| a.responder_name.clone()),
            assigned_at:    assignment.map(|a| a.assigned_at.0),
            resolved_at:    incident.resolved_at().map(|t| t.0),
            archived_at:    now.0,
            proof_note:     proof.map(|p| p.note.clone()),
        }
    }
}

/// Acknowledgement from an archive sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReceipt {
    pub incident:  IncidentId,
    /// Sink-specific locator (row number, primary key).
    pub reference: String,
}
