//! Nearest-unit selection.

use gd_core::{IncidentId, ResponderId};
use gd_incident::Incident;
use gd_registry::ResponderUnit;

/// A candidate `(incident, responder)` pair.  Transient; never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentAttempt {
    pub incident:       IncidentId,
    pub responder:      ResponderId,
    pub responder_name: String,
    pub distance_m:     f64,
}

/// The unit in `units` closest to `incident`.
///
/// Ties keep the first unit encountered; rosters iterate in ascending id,
/// so the lowest id wins.  The caller is responsible for filtering `units`
/// to available units of the right zone and department.
pub fn nearest_candidate(incident: &Incident, units: &[ResponderUnit]) -> Option<AssignmentAttempt> {
    let mut best: Option<(&ResponderUnit, f64)> = None;
    for unit in units {
        let d = incident.position.distance_m(unit.position);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((unit, d)),
        }
    }
    best.map(|(unit, distance_m)| AssignmentAttempt {
        incident:       incident.id,
        responder:      unit.id,
        responder_name: unit.name.clone(),
        distance_m,
    })
}
