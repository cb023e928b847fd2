//! Proof-of-completion seam.

use gd_core::ResponderId;
use gd_incident::Incident;

/// What a responder submits when marking an incident complete.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompletionProof {
    pub responder: ResponderId,
    /// Free-text summary from the field.
    pub note:      String,
    /// Opaque references to uploaded evidence (photo ids, URLs).
    pub evidence:  Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(String),
}

/// An external verification service.
pub trait Verifier: Send + Sync {
    fn verify(&self, incident: &Incident, proof: &CompletionProof) -> Verdict;
}

/// Accepts every proof.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl Verifier for AcceptAll {
    fn verify(&self, _incident: &Incident, _proof: &CompletionProof) -> Verdict {
        Verdict::Accepted
    }
}
