//! Simulated field units and citizens for the downtown scenario.

use anyhow::Result;
use rand::Rng;
use rand::rngs::SmallRng;

use gd_core::{Coordinate, Department, IncidentId, ResponderId, UserId};
use gd_incident::{IncidentStatus, NewIncident, Severity};
use gd_registry::Heartbeat;
use gd_resolution::CompletionProof;
use gd_service::{Service, ServiceError};

// Geohash cell 9q8yy, roughly the Mission and SoMa.
pub const MIN_LAT: f64 = 37.7500;
pub const MAX_LAT: f64 = 37.7920;
pub const MIN_LNG: f64 = -122.4310;
pub const MAX_LNG: f64 = -122.3880;

/// Metres a unit covers per tick while driving (about 54 km/h at 1 s ticks).
const DRIVE_STEP_M: f64 = 15.0;
/// Degrees of random drift per tick while idle.
const IDLE_JITTER: f64 = 0.00005;

pub fn random_point(rng: &mut SmallRng) -> Result<Coordinate> {
    Ok(Coordinate::new(rng.gen_range(MIN_LAT..MAX_LAT), rng.gen_range(MIN_LNG..MAX_LNG))?)
}

/// Move `from` up to `step_m` towards `to`.
fn step_towards(from: Coordinate, to: Coordinate, step_m: f64) -> Result<Coordinate> {
    let d = from.distance_m(to);
    if d <= step_m {
        return Ok(to);
    }
    let f = step_m / d;
    Ok(Coordinate::new(from.lat + (to.lat - from.lat) * f, from.lng + (to.lng - from.lng) * f)?)
}

pub struct Unit {
    pub id:         ResponderId,
    pub name:       String,
    pub department: Department,
    pub position:   Coordinate,
    /// Completion already submitted for this incident.
    pub submitted:  Option<IncidentId>,
}

impl Unit {
    fn heartbeat(&self) -> Heartbeat {
        Heartbeat {
            responder:  self.id,
            name:       self.name.clone(),
            department: self.department,
            position:   self.position,
        }
    }

    /// One tick of unit behaviour: start navigating to a fresh assignment,
    /// drive towards the scene, and report completion once on scene.
    pub fn step(&mut self, service: &Service, rng: &mut SmallRng) -> Result<()> {
        let task = service.registry().get(self.id).and_then(|u| u.current_task());
        let incident = task.and_then(|id| service.incidents().get(id));

        match incident {
            Some(inc) => {
                if inc.status() == IncidentStatus::Assigned {
                    service.start_navigation(inc.id, self.id)?;
                }
                self.position = step_towards(self.position, inc.position, DRIVE_STEP_M)?;
                let on_scene = self.position.distance_m(inc.position) <= service.config().arrival_threshold_m;
                if on_scene && inc.status() == IncidentStatus::Commuting && self.submitted != Some(inc.id) {
                    let proof = CompletionProof {
                        responder: self.id,
                        note:      format!("{} handled by {}", inc.department, self.name),
                        evidence:  vec![format!("photo-{}", inc.id.0)],
                    };
                    match service.submit_completion(inc.id, proof) {
                        Ok(_) => self.submitted = Some(inc.id),
                        Err(e) => log::debug!("{}: completion not accepted yet: {e}", self.name),
                    }
                }
            }
            None => {
                let lat = (self.position.lat + rng.gen_range(-IDLE_JITTER..IDLE_JITTER)).clamp(MIN_LAT, MAX_LAT);
                let lng = (self.position.lng + rng.gen_range(-IDLE_JITTER..IDLE_JITTER)).clamp(MIN_LNG, MAX_LNG);
                self.position = Coordinate::new(lat, lng)?;
            }
        }

        service.heartbeat(self.heartbeat())?;
        Ok(())
    }
}

pub fn build_fleet(per_department: u32, rng: &mut SmallRng) -> Result<Vec<Unit>> {
    let departments = [Department::Fire, Department::Water, Department::Electricity];
    let mut units = Vec::new();
    for (d, department) in departments.into_iter().enumerate() {
        for n in 0..per_department {
            let id = ResponderId(d as u32 * 100 + n + 1);
            units.push(Unit {
                id,
                name:      format!("{department}-{}", n + 1),
                department,
                position:  random_point(rng)?,
                submitted: None,
            });
        }
    }
    Ok(units)
}

/// A citizen who files one report and confirms the fix when it arrives.
pub struct Citizen {
    pub id:       UserId,
    pub raise_at: u64,
    pub incident: Option<IncidentId>,
    /// Changes their mind right after filing.
    pub cancels:  bool,
    pub done:     bool,
}

impl Citizen {
    pub fn step(&mut self, service: &Service, rng: &mut SmallRng) -> Result<()> {
        if self.done {
            return Ok(());
        }
        let now = service.now().0;

        let Some(id) = self.incident else {
            if now >= self.raise_at {
                let department = match rng.gen_range(0..3) {
                    0 => Department::Fire,
                    1 => Department::Water,
                    _ => Department::Electricity,
                };
                let severity = match rng.gen_range(0..4) {
                    0 => Severity::Low,
                    1 => Severity::Medium,
                    2 => Severity::High,
                    _ => Severity::Critical,
                };
                let filed = service.raise(NewIncident {
                    reporter: self.id,
                    department,
                    severity,
                    position: random_point(rng)?,
                    address:  format!("{} Valencia St", 100 + rng.gen_range(0..900)),
                });
                match filed {
                    Ok(raised) => {
                        log::info!("{} reported {} ({department}, {severity})", self.id, raised.incident.id);
                        self.incident = Some(raised.incident.id);
                    }
                    Err(ServiceError::Duplicate(dup)) => {
                        log::info!("{} was pointed at existing {}", self.id, dup.existing.id);
                        self.done = true;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            return Ok(());
        };

        if self.cancels {
            match service.cancel(id, self.id) {
                Ok(receipt) => log::info!("{} cancelled {id}, archived as {}", self.id, receipt.reference),
                Err(e) => log::warn!("{} could not cancel {id}: {e}", self.id),
            }
            self.done = true;
            return Ok(());
        }

        match service.incidents().get(id).map(|inc| inc.status()) {
            Some(IncidentStatus::Resolved) => {
                let receipt = service.confirm(id, self.id)?;
                log::info!("{} confirmed {id}, archived as {}", self.id, receipt.reference);
                self.done = true;
            }
            None => self.done = true,
            Some(_) => {}
        }
        Ok(())
    }
}
