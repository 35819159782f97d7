//! The `StepController` and its tick loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use uam_convert::{AbandonReason, ConversionMode, ConversionReport, Converted, ModeConverter, Outcome};
use uam_core::{ControlConfig, PersonId, SimRng, Step, StepClock, VehicleClass, VehicleId};
use uam_dispatch::{DispatchPolicy, ReservationPool};
use uam_engine::{LaneMeasurement, Rgba, TaxiState, TrafficEngine};
use uam_mm::{LaneSelector, close_encounters};
use uam_net::NetworkModel;
use uam_output::{
    ControlLog, CustomerEvent, CustomerRow, EncounterRow, LaneEventRow, OutputError, RowSink,
    ScooterEvent, TaxiRow,
};

use crate::error::ControlResult;
use crate::observer::StepObserver;
use crate::records::{CustomerRecord, ScooterRecord, TravelPhase};

// ── Per-step and per-run counters ─────────────────────────────────────────────

/// Counters for one completed tick.
#[derive(Clone, Debug, Default)]
pub struct StepStats {
    pub step:              Step,
    pub sim_secs:          u64,
    pub live_vehicles:     usize,
    pub live_persons:      usize,
    pub new_vehicles:      usize,
    pub converted_uam:     usize,
    pub converted_scooter: usize,
    pub reservations:      usize,
    pub dispatches:        usize,
    pub lane_changes:      usize,
    pub encounters:        usize,
}

/// Totals for a finished run.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub steps:             u64,
    pub converted_uam:     usize,
    pub converted_scooter: usize,
    pub reservations:      usize,
    pub dispatches:        usize,
    /// Rows lost to sink failures.
    pub lost_rows: usize,
    /// Rows dropped for want of a lifecycle record.
    pub skipped_rows: usize,
}

// ── StepController ────────────────────────────────────────────────────────────

/// Owns the engine connection and drives the fixed per-tick stage order.
///
/// Generic over the engine backend `E` and the log sink `S`; all state —
/// reservation pool, lifecycle records, last-step live sets — is owned
/// exclusively by the controller and mutated only between tick boundaries.
pub struct StepController<E: TrafficEngine, S: RowSink> {
    cfg:    ControlConfig,
    net:    Arc<NetworkModel>,
    engine: E,
    log:    ControlLog<S>,
    rng:    SimRng,
    clock:  StepClock,

    converter: ModeConverter,
    policy:    DispatchPolicy,
    selector:  LaneSelector,
    pool:      ReservationPool,

    hub_count: usize,
    seeded:    bool,

    customers: BTreeMap<PersonId, CustomerRecord>,
    scooters:  BTreeMap<VehicleId, ScooterRecord>,

    last_vehicles: FxHashSet<VehicleId>,
    last_persons:  FxHashSet<PersonId>,

    total_converted_uam:     usize,
    total_converted_scooter: usize,
    total_reservations:      usize,
    total_dispatches:        usize,
}

impl<E: TrafficEngine, S: RowSink> StepController<E, S> {
    /// Validate the configuration and wire up the components.
    ///
    /// Configuration rejection here is the only fatal startup error of the
    /// control layer.
    pub fn new(
        cfg:    ControlConfig,
        net:    Arc<NetworkModel>,
        engine: E,
        sink:   S,
    ) -> ControlResult<Self> {
        cfg.validate()?;
        let converter = ModeConverter::new(&cfg.conversion);
        let policy    = DispatchPolicy::new(&cfg.uam);
        let selector  = LaneSelector::new(&cfg.scooter);
        let rng       = SimRng::new(cfg.seed);
        let clock     = StepClock::new(cfg.step_secs);
        let hub_count = net.uam_hub_count();

        Ok(Self {
            cfg,
            net,
            engine,
            log: ControlLog::new(sink),
            rng,
            clock,
            converter,
            policy,
            selector,
            pool: ReservationPool::new(),
            hub_count,
            seeded: false,
            customers: BTreeMap::new(),
            scooters:  BTreeMap::new(),
            last_vehicles: FxHashSet::default(),
            last_persons:  FxHashSet::default(),
            total_converted_uam:     0,
            total_converted_scooter: 0,
            total_reservations:      0,
            total_dispatches:        0,
        })
    }

    // ── Accessors (used by demos and tests) ───────────────────────────────

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn pool(&self) -> &ReservationPool {
        &self.pool
    }

    pub fn customers(&self) -> &BTreeMap<PersonId, CustomerRecord> {
        &self.customers
    }

    pub fn scooters(&self) -> &BTreeMap<VehicleId, ScooterRecord> {
        &self.scooters
    }

    /// The first sink error of the run, if any.
    pub fn take_log_error(&mut self) -> Option<OutputError> {
        self.log.take_error()
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    /// Seed `vehicles_per_hub` taxis at every UAM pad.
    ///
    /// Engine failures here are fatal — this runs before the loop.
    pub fn seed_fleet(&mut self) -> ControlResult<usize> {
        let pads: Vec<_> = self.net.uam_parkings().collect();
        let mut seeded = 0;
        for pad in pads {
            for _ in 0..self.cfg.uam.vehicles_per_hub {
                self.engine.add_parked_taxi(pad)?;
                seeded += 1;
            }
        }
        self.seeded = true;
        Ok(seeded)
    }

    // ── Run loops ─────────────────────────────────────────────────────────

    /// Run until simulated time exceeds the horizon, then close sinks and
    /// the engine connection.
    pub fn run<O: StepObserver>(&mut self, observer: &mut O) -> ControlResult<RunSummary> {
        let taxis = if self.seeded { 0 } else { self.seed_fleet()? };
        observer.on_run_start(self.hub_count, taxis);

        while self.engine.sim_secs() <= self.cfg.horizon_secs as f64 {
            observer.on_step_start(self.clock.current.offset(1));
            let stats = self.step()?;
            observer.on_step_end(&stats);
        }

        let summary = self.finish();
        observer.on_run_end(&summary);
        Ok(summary)
    }

    /// Run exactly `n` ticks from the current position (ignores the
    /// horizon, performs no teardown).  Useful for tests and incremental
    /// stepping.
    pub fn run_steps<O: StepObserver>(&mut self, n: u64, observer: &mut O) -> ControlResult<()> {
        if !self.seeded {
            self.seed_fleet()?;
        }
        for _ in 0..n {
            observer.on_step_start(self.clock.current.offset(1));
            let stats = self.step()?;
            observer.on_step_end(&stats);
        }
        Ok(())
    }

    /// Close the log sinks and the engine connection; idempotent.
    pub fn finish(&mut self) -> RunSummary {
        self.log.finish();
        self.engine.close();
        RunSummary {
            steps:             self.clock.current.0,
            converted_uam:     self.total_converted_uam,
            converted_scooter: self.total_converted_scooter,
            reservations:      self.total_reservations,
            dispatches:        self.total_dispatches,
            lost_rows:         self.log.lost_rows(),
            skipped_rows:      self.log.skipped_rows(),
        }
    }

    // ── The tick ──────────────────────────────────────────────────────────

    /// One full pass of the stage order.  Stages are documented in the
    /// crate root; their order is load-bearing.
    fn step(&mut self) -> ControlResult<StepStats> {
        // ① Advance the engine.  This is the only fatal call in the loop.
        self.engine.advance()?;
        self.clock.advance();
        let step = self.clock.current;
        let secs = self.clock.elapsed_secs();

        // ② Snapshot live sets and diff against the previous tick.
        let vehicles: FxHashSet<VehicleId> = self.engine.vehicle_ids().into_iter().collect();
        let persons:  FxHashSet<PersonId>  = self.engine.person_ids().into_iter().collect();
        let live_vehicles = vehicles.len();
        let live_persons  = persons.len();

        let mut gone_vehicles: Vec<VehicleId> =
            self.last_vehicles.difference(&vehicles).copied().collect();
        gone_vehicles.sort_unstable();
        let mut gone_persons: Vec<PersonId> =
            self.last_persons.difference(&persons).copied().collect();
        gone_persons.sort_unstable();
        // Ascending id order keeps the conversion draw sequence reproducible.
        let mut fresh_vehicles: Vec<VehicleId> =
            vehicles.difference(&self.last_vehicles).copied().collect();
        fresh_vehicles.sort_unstable();
        let new_vehicles = fresh_vehicles.len();

        // ③ Report terminated converted agents and drop their records.
        for person in gone_persons {
            if let Some(record) = self.customers.remove(&person) {
                let row = self.customer_row(
                    step, secs, Some(person), None, CustomerEvent::Terminated, None, &record,
                );
                self.log.customer(&row);
            }
        }
        for vehicle in gone_vehicles {
            if let Some(record) = self.scooters.remove(&vehicle) {
                let row = self.lane_row(
                    step, secs, Some(vehicle), None, None, None, &record, ScooterEvent::Terminated,
                );
                self.log.lane_event(&row);
            }
        }

        // ④ Conversions: UAM first, then scooters over what remains.
        let reports = self.converter.run_step(
            &self.net,
            &mut self.engine,
            &fresh_vehicles,
            ConversionMode::Uam,
            self.cfg.uam.density,
            &mut self.rng,
        );
        let converted_uam = self.absorb_uam_reports(step, secs, reports, &mut fresh_vehicles);

        let reports = self.converter.run_step(
            &self.net,
            &mut self.engine,
            &fresh_vehicles,
            ConversionMode::Scooter,
            self.cfg.scooter.density,
            &mut self.rng,
        );
        let converted_scooter =
            self.absorb_scooter_reports(step, secs, reports, &mut fresh_vehicles);

        self.adopt_native_scooters(step, secs, &fresh_vehicles);

        // ⑤ Periodic lane selection; proximity scan when enabled.
        let mut lane_changes = 0;
        if step.is_multiple_of(self.cfg.lane_find_period_steps()) {
            let scooter_ids: Vec<VehicleId> = self.scooters.keys().copied().collect();
            for scooter in scooter_ids {
                let change = match self.selector.select_for(&self.net, &mut self.engine, scooter) {
                    Ok(Some(change)) => change,
                    Ok(None) => continue,
                    // Vanished mid-query; next tick's diff cleans it up.
                    Err(_) => continue,
                };
                lane_changes += 1;
                let Some(record) = self.scooters.get(&scooter).copied() else { continue };
                let position = self.engine.vehicle_position(scooter).ok().map(|p| p.rounded());
                let row = self.lane_row(
                    step,
                    secs,
                    Some(scooter),
                    position,
                    Some(change.kind.as_str()),
                    Some(change.measurement),
                    &record,
                    ScooterEvent::LaneSelection,
                );
                self.log.lane_event(&row);
            }
        }

        let mut encounters = 0;
        if self.cfg.scooter.encounter_log {
            let scooter_ids: Vec<VehicleId> = self.scooters.keys().copied().collect();
            for scooter in scooter_ids {
                let Ok(hits) =
                    close_encounters(&self.engine, scooter, self.cfg.scooter.encounter_distance_m)
                else {
                    continue;
                };
                for hit in hits {
                    encounters += 1;
                    let row = EncounterRow {
                        step:        step.0,
                        sim_secs:    secs,
                        scooter:     hit.scooter,
                        scooter_pos: (hit.scooter_pos.x, hit.scooter_pos.y),
                        person:      hit.person,
                        person_pos:  (hit.person_pos.x, hit.person_pos.y),
                        distance_m:  hit.distance_m,
                        measurement: hit.measurement,
                        threshold_m: self.cfg.scooter.encounter_distance_m,
                    };
                    self.log.encounter(&row);
                }
            }
        }

        // ⑥ Age the pool, absorb this tick's reservations, dispatch.
        self.pool.tick(self.cfg.step_secs);
        let fresh_reservations = self.engine.drain_reservations();
        let reservations = fresh_reservations.len();
        for reservation in &fresh_reservations {
            self.pool.admit(reservation);
            let Some(&person) = reservation.persons.first() else { continue };
            let record = self.customers.get_mut(&person).map(|r| {
                r.phase = TravelPhase::Waiting;
                *r
            });
            match record {
                Some(record) => {
                    let position = self.engine.person_position(person).ok().map(|p| p.rounded());
                    let row = self.customer_row(
                        step, secs, Some(person), None, CustomerEvent::Waiting, position, &record,
                    );
                    self.log.customer(&row);
                }
                None => self.log.skip_missing_record(person),
            }
        }
        let dispatched = self.policy.run(&mut self.pool, &self.net, &mut self.engine);
        let dispatches = dispatched.len();

        // ⑦ Cosmetic fleet recoloring, only with a display attached.
        if self.cfg.display {
            for taxi in self.engine.taxi_fleet(TaxiState::Idle) {
                self.engine.set_vehicle_color(taxi, Rgba::GREEN);
            }
            for taxi in self.engine.taxi_fleet(TaxiState::EnRoute) {
                self.engine.set_vehicle_color(taxi, Rgba::CYAN);
            }
            for taxi in self.engine.taxi_fleet(TaxiState::Occupied) {
                self.engine.set_vehicle_color(taxi, Rgba::RED);
            }
        }

        // ⑧ Fleet snapshot rows, then flight transitions from the engine's
        // assigned-vehicle field.
        for state in TaxiState::ALL {
            for taxi in self.engine.taxi_fleet(state) {
                let Ok(position) = self.engine.vehicle_position(taxi) else { continue };
                let passengers = self.engine.vehicle_passengers(taxi).unwrap_or_default();
                let customers = (!passengers.is_empty()).then(|| {
                    passengers.iter().map(ToString::to_string).collect::<Vec<_>>().join("-")
                });
                let row = TaxiRow {
                    step:     step.0,
                    sim_secs: secs,
                    taxi,
                    state,
                    position: position.rounded(),
                    passenger_count: passengers.len(),
                    customers,
                    hub_count: self.hub_count,
                };
                self.log.taxi(&row);
            }
        }
        self.flight_transitions(step, secs);

        // ⑨ Persist the live sets for the next tick's diff.
        self.last_vehicles = vehicles;
        self.last_persons  = persons;

        self.total_converted_uam     += converted_uam;
        self.total_converted_scooter += converted_scooter;
        self.total_reservations      += reservations;
        self.total_dispatches        += dispatches;

        Ok(StepStats {
            step,
            sim_secs: secs,
            live_vehicles,
            live_persons,
            new_vehicles,
            converted_uam,
            converted_scooter,
            reservations,
            dispatches,
            lane_changes,
            encounters,
        })
    }

    // ── Stage helpers ─────────────────────────────────────────────────────

    fn absorb_uam_reports(
        &mut self,
        step:  Step,
        secs:  u64,
        reports: Vec<ConversionReport>,
        fresh:   &mut Vec<VehicleId>,
    ) -> usize {
        let mut converted = 0;
        for report in reports {
            match report.outcome {
                Outcome::Converted(Converted::Customer { person, walk_only }) => {
                    converted += 1;
                    fresh.retain(|&v| v != report.original);
                    let record = CustomerRecord::new(report.origin, report.dest, report.original);
                    self.customers.insert(person, record);
                    let position = self.engine.person_position(person).ok().map(|p| p.rounded());
                    let event = if walk_only {
                        CustomerEvent::OnlyWalking
                    } else {
                        CustomerEvent::Walking
                    };
                    let row =
                        self.customer_row(step, secs, Some(person), None, event, position, &record);
                    self.log.customer(&row);
                }
                Outcome::Abandoned(reason) => {
                    let record = CustomerRecord::new(report.origin, report.dest, report.original);
                    let event = match reason {
                        AbandonReason::NoRoute       => CustomerEvent::NoRoute,
                        AbandonReason::NoAlternative => CustomerEvent::NoAlternative,
                    };
                    let row = self.customer_row(step, secs, None, None, event, None, &record);
                    self.log.customer(&row);
                }
                // A UAM pass never yields scooters.
                Outcome::Converted(Converted::Scooter { .. }) => {}
            }
        }
        converted
    }

    fn absorb_scooter_reports(
        &mut self,
        step:  Step,
        secs:  u64,
        reports: Vec<ConversionReport>,
        fresh:   &mut Vec<VehicleId>,
    ) -> usize {
        let mut converted = 0;
        for report in reports {
            match report.outcome {
                Outcome::Converted(Converted::Scooter { vehicle }) => {
                    converted += 1;
                    fresh.retain(|&v| v != report.original);
                    let record = ScooterRecord::new(
                        report.origin,
                        report.dest,
                        report.original,
                        report.original_class,
                    );
                    self.scooters.insert(vehicle, record);
                    let position = self.engine.vehicle_position(vehicle).ok().map(|p| p.rounded());
                    let row = self.lane_row(
                        step, secs, Some(vehicle), position, None, None, &record,
                        ScooterEvent::New,
                    );
                    self.log.lane_event(&row);
                }
                Outcome::Abandoned(reason) => {
                    let record = ScooterRecord::new(
                        report.origin,
                        report.dest,
                        report.original,
                        report.original_class,
                    );
                    let event = match reason {
                        AbandonReason::NoRoute       => ScooterEvent::NoRoute,
                        AbandonReason::NoAlternative => ScooterEvent::NoAlternative,
                    };
                    let row = self.lane_row(step, secs, None, None, None, None, &record, event);
                    self.log.lane_event(&row);
                }
                // A scooter pass never yields customers.
                Outcome::Converted(Converted::Customer { .. }) => {}
            }
        }
        converted
    }

    /// Track scooters the engine spawned on its own (scripted demand with a
    /// scooter class) so lane selection covers them too.
    fn adopt_native_scooters(&mut self, step: Step, secs: u64, fresh: &[VehicleId]) {
        for &vehicle in fresh {
            if self.scooters.contains_key(&vehicle) {
                continue;
            }
            if !matches!(self.engine.vehicle_class(vehicle), Ok(VehicleClass::Scooter)) {
                continue;
            }
            let Ok(route) = self.engine.vehicle_route(vehicle) else { continue };
            let (Some(&first), Some(&last)) = (route.first(), route.last()) else { continue };
            let record = ScooterRecord::new(
                self.net.edge_origin(first),
                self.net.edge_origin(last),
                vehicle,
                VehicleClass::Scooter,
            );
            self.scooters.insert(vehicle, record);
            let position = self.engine.vehicle_position(vehicle).ok().map(|p| p.rounded());
            let row = self.lane_row(
                step, secs, Some(vehicle), position, None, None, &record, ScooterEvent::New,
            );
            self.log.lane_event(&row);
        }
    }

    /// Detect waiting→flying and flying→walking from the engine's
    /// assigned-vehicle field and log one row per transition.
    fn flight_transitions(&mut self, step: Step, secs: u64) {
        enum Transition {
            Start(PersonId, VehicleId),
            End(PersonId),
        }

        let mut transitions: Vec<Transition> = Vec::new();
        for (&person, record) in &self.customers {
            match record.phase {
                TravelPhase::Waiting => {
                    if let Ok(Some(taxi)) = self.engine.person_vehicle(person) {
                        transitions.push(Transition::Start(person, taxi));
                    }
                }
                TravelPhase::Flying => {
                    if let Ok(None) = self.engine.person_vehicle(person) {
                        transitions.push(Transition::End(person));
                    }
                }
                TravelPhase::Walking => {}
            }
        }

        for transition in transitions {
            let (person, vehicle, event, phase) = match transition {
                Transition::Start(p, t) => {
                    (p, Some(t), CustomerEvent::Flying, TravelPhase::Flying)
                }
                Transition::End(p) => (p, None, CustomerEvent::Walking, TravelPhase::Walking),
            };
            let record = self.customers.get_mut(&person).map(|r| {
                r.phase = phase;
                *r
            });
            let Some(record) = record else { continue };
            let position = self.engine.person_position(person).ok().map(|p| p.rounded());
            let row = self.customer_row(step, secs, Some(person), vehicle, event, position, &record);
            self.log.customer(&row);
        }
    }

    // ── Row builders ──────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn customer_row(
        &self,
        step:     Step,
        sim_secs: u64,
        person:   Option<PersonId>,
        vehicle:  Option<VehicleId>,
        event:    CustomerEvent,
        position: Option<(i32, i32)>,
        record:   &CustomerRecord,
    ) -> CustomerRow {
        CustomerRow {
            step: step.0,
            sim_secs,
            person,
            vehicle,
            event,
            position,
            route_start: record.origin,
            route_dest:  record.dest,
            original:    record.original,
            uam_density:        self.cfg.uam.density,
            mm_density:         self.cfg.scooter.density,
            vehicles_per_hub:   self.cfg.uam.vehicles_per_hub,
            vehicle_capacity:   self.cfg.uam.capacity,
            group_finding_secs: self.cfg.uam.group_finding_secs,
            hub_count:          self.hub_count,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn lane_row(
        &self,
        step:        Step,
        sim_secs:    u64,
        scooter:     Option<VehicleId>,
        position:    Option<(i32, i32)>,
        lane_kind:   Option<&'static str>,
        measurement: Option<LaneMeasurement>,
        record:      &ScooterRecord,
        event:       ScooterEvent,
    ) -> LaneEventRow {
        LaneEventRow {
            step: step.0,
            sim_secs,
            scooter,
            position,
            lane_kind,
            measurement,
            route_start: record.origin,
            route_dest:  record.dest,
            original:       record.original,
            original_class: record.original_class,
            uam_density:           self.cfg.uam.density,
            mm_density:            self.cfg.scooter.density,
            lane_change_secs:      self.cfg.scooter.lane_change_secs,
            lane_find_period_secs: self.cfg.scooter.lane_find_period_secs,
            sidewalk_occupancy_threshold: self.cfg.scooter.sidewalk_occupancy_threshold,
            road_occupancy_threshold:     self.cfg.scooter.road_occupancy_threshold,
            road_speed_threshold:         self.cfg.scooter.road_speed_threshold,
            road_length_threshold:        self.cfg.scooter.road_length_threshold,
            event,
        }
    }
}
