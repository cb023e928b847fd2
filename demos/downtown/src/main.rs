//! downtown — end-to-end run of the geodispatch engine.
//!
//! A small mixed fleet (fire, water, electricity) patrols one roster zone in
//! San Francisco while citizens file incidents.  Fire reports dispatch at
//! once; the rest wait out the manual-assignment window.  Units drive to the
//! scene, report completion, and the reporter's confirmation archives the
//! incident to `archive.csv`.
//!
//! ```text
//! RUST_LOG=info cargo run -p downtown -- --ticks 900 --out output/downtown
//! ```

mod fleet;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use gd_core::{DispatchConfig, Tick, UserId};
use gd_dispatch::{AssignmentAttempt, SweepReport};
use gd_resolution::{ArchiveSink, CsvArchive};
use gd_service::{ServiceBuilder, ServiceObserver, TickSummary};
use gd_tracking::TrackingSignal;

use fleet::{Citizen, build_fleet};

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Geodispatch demo over a downtown roster zone.
#[derive(Parser, Debug)]
#[command(name = "downtown", version, about)]
struct Args {
    /// JSON file with `DispatchConfig` overrides; missing fields keep defaults.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Ticks to run.
    #[arg(short, long, default_value_t = 900)]
    ticks: u64,

    /// Units per department.
    #[arg(short, long, default_value_t = 3)]
    units: u32,

    /// Citizens filing one report each.
    #[arg(long, default_value_t = 8)]
    citizens: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output directory for the archive.
    #[arg(short, long, default_value = "output/downtown")]
    out: PathBuf,
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    assigned: usize,
    sweeps:   usize,
    arrivals: usize,
    lost:     usize,
    expired:  usize,
}

impl ServiceObserver for Tally {
    fn on_assignment(&mut self, tick: Tick, a: &AssignmentAttempt) {
        log::info!("{tick}: {} -> {} ({} at {:.0} m)", a.incident, a.responder, a.responder_name, a.distance_m);
        self.assigned += 1;
    }

    fn on_sweep(&mut self, tick: Tick, report: &SweepReport) {
        log::debug!(
            "{tick}: sweep over {} zones, {} attempted, {} assigned",
            report.zones, report.attempted, report.assigned.len()
        );
        self.sweeps += 1;
    }

    fn on_signal(&mut self, tick: Tick, signal: &TrackingSignal) {
        match signal {
            TrackingSignal::Arrived { incident, responder, distance_m } => {
                log::info!("{tick}: {responder} on scene at {incident} ({distance_m:.0} m)");
                self.arrivals += 1;
            }
            TrackingSignal::SignalLost { incident, responder, .. } => {
                log::warn!("{tick}: lost {responder} en route to {incident}");
                self.lost += 1;
            }
            other => log::debug!("{tick}: {other:?}"),
        }
    }

    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        self.expired += summary.expired_units.len();
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&PathBuf>) -> Result<DispatchConfig> {
    let Some(path) = path else {
        return Ok(DispatchConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    std::fs::create_dir_all(&args.out)?;
    let archive = Arc::new(CsvArchive::new(&args.out)?);

    let mut service = ServiceBuilder::new(config)
        .archive(archive.clone())
        .threat_neighbors(true)
        .build()?;

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut units = build_fleet(args.units, &mut rng)?;
    let mut citizens: Vec<Citizen> = (0..args.citizens)
        .map(|i| Citizen {
            id:       UserId(i + 1),
            raise_at: 5 + u64::from(i) * 45,
            incident: None,
            // Every fifth citizen thinks better of it.
            cancels:  i % 5 == 4,
            done:     false,
        })
        .collect();

    println!("=== downtown — geodispatch ===");
    println!(
        "Units: {}  |  Citizens: {}  |  Ticks: {}  |  Seed: {}",
        units.len(), citizens.len(), args.ticks, args.seed
    );

    let mut tally = Tally::default();
    let t0 = Instant::now();
    for _ in 0..args.ticks {
        for unit in &mut units {
            unit.step(&service, &mut rng)?;
        }
        for citizen in &mut citizens {
            citizen.step(&service, &mut rng)?;
        }
        service.run_ticks(1, &mut tally)?;
    }
    archive.finish()?;
    let elapsed = t0.elapsed();

    let open = service.incidents().len();
    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!("  assignments (timer)  : {}", tally.assigned);
    println!("  sweeps               : {}", tally.sweeps);
    println!("  arrivals             : {}", tally.arrivals);
    println!("  lost signals         : {}", tally.lost);
    println!("  expired units        : {}", tally.expired);
    println!("  incidents still open : {open}");
    println!("  archive              : {}", args.out.join("archive.csv").display());
    println!();

    println!("{:<8} {:<16} {:<10} {:<12}", "Unit", "Name", "Status", "Completed");
    println!("{}", "-".repeat(48));
    for unit in &units {
        let status = service.registry().get(unit.id).map_or("GONE", |u| u.status().as_str());
        println!(
            "{:<8} {:<16} {:<10} {:<12}",
            unit.id.0,
            unit.name,
            status,
            service.registry().history(unit.id).len(),
        );
    }

    Ok(())
}
