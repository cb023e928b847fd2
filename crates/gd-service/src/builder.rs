//! Fluent builder for constructing a [`Service`].

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use gd_broadcast::ThreatBoard;
use gd_core::DispatchConfig;
use gd_dispatch::{DispatchEngine, Dispatcher};
use gd_incident::IncidentStore;
use gd_registry::ResponderRegistry;
use gd_resolution::{AcceptAll, ArchiveSink, MemoryArchive, ResolutionWorkflow, Verifier};
use gd_tracking::{DirectionsProvider, StraightLineDirections, Tracker};
use gd_zone::Precision;

use crate::{Service, ServiceResult};

/// Fluent builder for [`Service`].
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                          |
/// |------------------------|----------------------------------|
/// | `.archive(s)`          | `MemoryArchive`                  |
/// | `.verifier(v)`         | `AcceptAll`                      |
/// | `.directions(d)`       | `StraightLineDirections` 30 km/h |
/// | `.threat_neighbors(b)` | `false`                          |
///
/// # Example
///
/// ```rust,ignore
/// let mut service = ServiceBuilder::new(config)
///     .archive(Arc::new(CsvArchive::new(&out_dir)?))
///     .build()?;
/// service.run_ticks(600, &mut NoopObserver)?;
/// ```
pub struct ServiceBuilder {
    config:           DispatchConfig,
    archive:          Option<Arc<dyn ArchiveSink>>,
    verifier:         Option<Arc<dyn Verifier>>,
    directions:       Option<Arc<dyn DirectionsProvider>>,
    threat_neighbors: bool,
}

impl ServiceBuilder {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            archive:          None,
            verifier:         None,
            directions:       None,
            threat_neighbors: false,
        }
    }

    /// Durable storage for finished incidents.
    pub fn archive(mut self, sink: Arc<dyn ArchiveSink>) -> Self {
        self.archive = Some(sink);
        self
    }

    /// Gate on responder-submitted completion proofs.
    pub fn verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn directions(mut self, directions: Arc<dyn DirectionsProvider>) -> Self {
        self.directions = Some(directions);
        self
    }

    /// Let threat lookups see markers in the buckets around the observer.
    pub fn threat_neighbors(mut self, on: bool) -> Self {
        self.threat_neighbors = on;
        self
    }

    /// Validate the configuration and wire every component together.
    pub fn build(self) -> ServiceResult<Service> {
        self.config.validate()?;
        let roster = Precision::new(self.config.roster_precision)?;

        let registry = Arc::new(ResponderRegistry::new(roster));
        let incidents = Arc::new(IncidentStore::new(roster));

        let engine = DispatchEngine::new(Arc::clone(&registry), Arc::clone(&incidents));
        let dispatcher = Dispatcher::new(engine, &self.config);

        let directions = self.directions.unwrap_or_else(|| Arc::new(StraightLineDirections::default()));
        let tracker = Tracker::new(Arc::clone(&registry), Arc::clone(&incidents), &self.config)
            .with_directions(directions);

        let resolution = ResolutionWorkflow::new(
            Arc::clone(&incidents),
            Arc::clone(&registry),
            self.archive.unwrap_or_else(|| Arc::new(MemoryArchive::new())),
            self.verifier.unwrap_or_else(|| Arc::new(AcceptAll)),
            &self.config,
        );

        let threats = ThreatBoard::from_config(&self.config)?.with_neighbors(self.threat_neighbors);

        log::info!(
            "service ready: roster precision {}, threat precision {}, sweep every {} ticks",
            roster.get(),
            threats.precision().get(),
            self.config.sweep_interval_ticks(),
        );

        Ok(Service {
            clock: self.config.make_clock(),
            config: self.config,
            registry,
            incidents,
            dispatcher,
            tracker,
            resolution,
            threats,
            pending_archive: Mutex::new(BTreeSet::new()),
        })
    }
}
