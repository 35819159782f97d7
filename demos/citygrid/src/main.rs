//! citygrid — runnable demo of the rust_uam control layer.
//!
//! Builds a synthetic 4×4 street grid with two UAM hubs, scripts random car
//! demand into the in-memory engine, and runs the full control loop: trip
//! conversion, reservation pooling, taxi dispatch, scooter lane selection,
//! and CSV event logging under `output/citygrid/`.

mod city;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use uam_control::{RunSummary, StepController, StepObserver, StepStats};
use uam_core::{ControlConfig, SimRng, VehicleClass};
use uam_engine::SyntheticEngine;
use uam_output::CsvSink;

use city::build_city;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64 = 42;
const HORIZON_SECS:    u64 = 1_800; // half a simulated hour
const TRIP_COUNT:      usize = 400;
const PROGRESS_EVERY:  u64 = 300;

// ── Progress observer ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    converted: usize,
    dispatches: usize,
}

impl StepObserver for Progress {
    fn on_run_start(&mut self, hubs: usize, taxis: usize) {
        println!("Seeded {taxis} air taxis across {hubs} hubs");
        println!();
    }

    fn on_step_end(&mut self, stats: &StepStats) {
        self.converted += stats.converted_uam + stats.converted_scooter;
        self.dispatches += stats.dispatches;
        if stats.step.is_multiple_of(PROGRESS_EVERY) {
            println!(
                "t={:>5}s  vehicles={:<3} pedestrians={:<3} converted={:<3} dispatches={}",
                stats.sim_secs, stats.live_vehicles, stats.live_persons,
                self.converted, self.dispatches,
            );
        }
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        println!();
        println!("Run complete after {} steps", summary.steps);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== citygrid — rust_uam control demo ===");
    println!("Trips: {TRIP_COUNT}  |  Horizon: {HORIZON_SECS} s  |  Seed: {SEED}");
    println!();

    // 1. Topology.
    let city = build_city();
    println!(
        "Network: {} junctions, {} edges, {} UAM hubs",
        city.net.junction_count(),
        city.net.edge_count(),
        city.net.uam_hub_count(),
    );

    // 2. Configuration — one immutable object for the whole run.
    let mut cfg = ControlConfig {
        scenario:     "citygrid".to_owned(),
        step_secs:    1,
        horizon_secs: HORIZON_SECS,
        seed:         SEED,
        display:      false,
        ..ControlConfig::default()
    };
    cfg.uam.density = 0.25;
    cfg.scooter.density = 0.15;
    cfg.uam.group_finding_secs = 120;
    cfg.scooter.encounter_log = true;

    // 3. Engine with scripted demand.  The demand generator uses a child of
    //    the master seed so it never disturbs the conversion draw sequence.
    let mut engine = SyntheticEngine::new(Arc::clone(&city.net), cfg.step_secs);
    engine.set_pickup_secs(30);
    let mut demand_rng = SimRng::new(SEED).child(1);
    let mut scheduled = 0;
    while scheduled < TRIP_COUNT {
        let step = demand_rng.gen_range(1..HORIZON_SECS / 2);
        let from = *demand_rng.choose(&city.streets).expect("streets non-empty");
        let to   = *demand_rng.choose(&city.streets).expect("streets non-empty");
        if from == to {
            continue;
        }
        engine.schedule_trip(step, VehicleClass::Passenger, from, to);
        scheduled += 1;
    }

    // 4. Output sinks.
    std::fs::create_dir_all("output/citygrid")?;
    let sink = CsvSink::new(Path::new("output/citygrid"), &cfg.scenario)?;

    // 5. Run.
    let mut controller = StepController::new(cfg, Arc::clone(&city.net), engine, sink)?;
    let t0 = Instant::now();
    let summary = controller.run(&mut Progress::default())?;
    let elapsed = t0.elapsed();

    if let Some(e) = controller.take_log_error() {
        eprintln!("log error: {e}");
    }

    // 6. Summary.
    println!("Simulated {} steps in {:.3} s", summary.steps, elapsed.as_secs_f64());
    println!("  UAM conversions     : {}", summary.converted_uam);
    println!("  scooter conversions : {}", summary.converted_scooter);
    println!("  reservations pooled : {}", summary.reservations);
    println!("  taxi dispatches     : {}", summary.dispatches);
    if summary.lost_rows + summary.skipped_rows > 0 {
        println!(
            "  log rows lost/skipped: {}/{}",
            summary.lost_rows, summary.skipped_rows
        );
    }
    println!();
    println!("Event logs written to output/citygrid/*.csv");

    Ok(())
}
