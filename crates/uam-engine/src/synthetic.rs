//! `SyntheticEngine` — an in-memory reference engine.
//!
//! A deliberately coarse stand-in for the production micro-simulation:
//! vehicles hop one edge per step, taxis follow a three-phase tour state
//! machine (parked → pickup → ride), and pedestrians execute walk/taxi plans
//! leg by leg.  No car-following, no signals, no physics.  It exists so the
//! control layer can be exercised end to end — demos and integration tests
//! drive exactly the same per-step API a production backend would expose.
//!
//! Determinism: all agent maps are `BTreeMap`s, so id listings and fleet
//! partitions come back in ascending id order on every platform.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use uam_core::{
    EdgeId, LaneRef, ParkingId, PersonId, Point, ReservationId, VehicleClass, VehicleId,
};
use uam_net::{DijkstraRouter, EdgeRouter, NetworkModel};

use crate::engine::TrafficEngine;
use crate::error::{EngineError, EngineResult};
use crate::types::{LaneMeasurement, LegMode, PlanLeg, Reservation, Rgba, TaxiState};

/// Assumed cruise speed of an air taxi between hubs, m/s.
const TAXI_CRUISE_MPS: f32 = 50.0;

/// Typical vehicle length per class, metres — used for computed lane
/// occupancy when no override is scripted.
fn class_length_m(class: VehicleClass) -> f32 {
    match class {
        VehicleClass::Passenger  => 5.0,
        VehicleClass::Taxi       => 9.2,
        VehicleClass::Bus        => 12.0,
        VehicleClass::Truck      => 10.0,
        VehicleClass::Bicycle    => 1.8,
        VehicleClass::Scooter    => 1.2,
        VehicleClass::Pedestrian => 0.5,
    }
}

// ── Internal agent state ──────────────────────────────────────────────────────

struct Vehicle {
    class:           VehicleClass,
    route:           Vec<EdgeId>,
    /// Index of the current edge within `route` (trip vehicles only).
    at:              usize,
    lane:            u8,
    /// Step until which a commanded lane change pins the lane.
    lane_until_step: u64,
    duty:            Duty,
    color:           Option<Rgba>,
}

enum Duty {
    /// An ordinary trip vehicle following its route.
    Trip,
    Taxi(TaxiPhase),
}

enum TaxiPhase {
    Parked {
        parking: ParkingId,
    },
    Pickup {
        secs_left:    u32,
        customers:    Vec<PersonId>,
        pickup_edge:  EdgeId,
        dest_edge:    EdgeId,
        ride_secs:    u32,
        dest_parking: ParkingId,
    },
    Ride {
        secs_left:    u32,
        customers:    Vec<PersonId>,
        dest_edge:    EdgeId,
        dest_parking: ParkingId,
    },
}

struct Person {
    edge:       EdgeId,
    plan:       Vec<PlanLeg>,
    leg:        usize,
    /// Edges completed within the current walk leg.
    edges_done: usize,
    vehicle:    Option<VehicleId>,
    /// Leg index for which a reservation has already been issued.
    issued_leg: Option<usize>,
    color:      Option<Rgba>,
}

struct TripSpec {
    class: VehicleClass,
    from:  EdgeId,
    to:    EdgeId,
}

// ── SyntheticEngine ───────────────────────────────────────────────────────────

/// In-memory engine over a [`NetworkModel`].
///
/// Construct with [`SyntheticEngine::new`], script demand with
/// [`schedule_trip`][Self::schedule_trip], then drive it through the
/// [`TrafficEngine`] trait.
pub struct SyntheticEngine {
    net:       Arc<NetworkModel>,
    router:    DijkstraRouter,
    step_secs: u32,
    step:      u64,
    closed:    bool,

    /// Boarding delay added to every pickup, seconds.
    pickup_secs: u32,

    next_vehicle:     u32,
    next_person:      u32,
    next_reservation: u32,

    vehicles: BTreeMap<VehicleId, Vehicle>,
    persons:  BTreeMap<PersonId, Person>,

    /// Open reservations, dispatchable by id.
    reservations: FxHashMap<ReservationId, Reservation>,
    /// Reservations issued since the last `drain_reservations` call.
    fresh_reservations: Vec<Reservation>,

    /// Scripted demand: step → trips to spawn.
    demand: BTreeMap<u64, Vec<TripSpec>>,

    /// Scripted lane measurements (tests); computed values used otherwise.
    lane_overrides: FxHashMap<LaneRef, LaneMeasurement>,

    /// Hub-apron edges where UAM customers board, precomputed.
    boarding_edges: Vec<EdgeId>,
}

impl SyntheticEngine {
    pub fn new(net: Arc<NetworkModel>, step_secs: u32) -> Self {
        let boarding_edges = net.uam_boarding_edges();
        Self {
            net,
            router: DijkstraRouter,
            step_secs,
            step: 0,
            closed: false,
            pickup_secs: 60,
            next_vehicle: 0,
            next_person: 0,
            next_reservation: 0,
            vehicles: BTreeMap::new(),
            persons: BTreeMap::new(),
            reservations: FxHashMap::default(),
            fresh_reservations: Vec::new(),
            demand: BTreeMap::new(),
            lane_overrides: FxHashMap::default(),
            boarding_edges,
        }
    }

    /// The topology this engine simulates on.
    pub fn network(&self) -> &Arc<NetworkModel> {
        &self.net
    }

    /// Script a trip to spawn at `step` (skipped silently if unroutable,
    /// like demand the production engine cannot insert).
    pub fn schedule_trip(&mut self, step: u64, class: VehicleClass, from: EdgeId, to: EdgeId) {
        self.demand.entry(step).or_default().push(TripSpec { class, from, to });
    }

    /// Pin the reported measurement for one lane.
    pub fn set_lane_measurement(&mut self, lane: LaneRef, m: LaneMeasurement) {
        self.lane_overrides.insert(lane, m);
    }

    /// Override the fixed boarding delay (default 60 s).
    pub fn set_pickup_secs(&mut self, secs: u32) {
        self.pickup_secs = secs;
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn vehicle(&self, v: VehicleId) -> EngineResult<&Vehicle> {
        self.vehicles.get(&v).ok_or(EngineError::UnknownVehicle(v))
    }

    fn person(&self, p: PersonId) -> EngineResult<&Person> {
        self.persons.get(&p).ok_or(EngineError::UnknownPerson(p))
    }

    fn mint_vehicle(&mut self) -> VehicleId {
        let id = VehicleId(self.next_vehicle);
        self.next_vehicle += 1;
        id
    }

    /// Edge a vehicle currently occupies.
    fn current_edge(&self, v: &Vehicle) -> EdgeId {
        match &v.duty {
            Duty::Trip => v.route[v.at.min(v.route.len() - 1)],
            Duty::Taxi(TaxiPhase::Parked { parking }) => self.net.parking_edge(*parking),
            Duty::Taxi(TaxiPhase::Pickup { pickup_edge, .. }) => *pickup_edge,
            Duty::Taxi(TaxiPhase::Ride { dest_edge, .. }) => *dest_edge,
        }
    }

    fn taxi_state(duty: &Duty) -> Option<TaxiState> {
        match duty {
            Duty::Trip => None,
            Duty::Taxi(TaxiPhase::Parked { .. }) => Some(TaxiState::Idle),
            Duty::Taxi(TaxiPhase::Pickup { .. }) => Some(TaxiState::EnRoute),
            Duty::Taxi(TaxiPhase::Ride { .. }) => Some(TaxiState::Occupied),
        }
    }

    fn spawn_due_demand(&mut self) {
        let Some(specs) = self.demand.remove(&self.step) else {
            return;
        };
        for spec in specs {
            let Ok(route) = self.router.route(&self.net, spec.from, spec.to, spec.class) else {
                continue;
            };
            let id = self.mint_vehicle();
            self.vehicles.insert(id, Vehicle {
                class:           spec.class,
                route:           route.edges,
                at:              0,
                lane:            0,
                lane_until_step: 0,
                duty:            Duty::Trip,
                color:           None,
            });
        }
    }

    fn progress_vehicles(&mut self) {
        let ids: Vec<VehicleId> = self.vehicles.keys().copied().collect();
        for id in ids {
            // Trip vehicles hop one edge per step and vanish at route end.
            let done = {
                let v = self.vehicles.get_mut(&id).expect("collected id");
                if matches!(v.duty, Duty::Trip) {
                    v.at += 1;
                    // A commanded lane pin lapses once its duration passes.
                    if self.step > v.lane_until_step {
                        v.lane = 0;
                    }
                    v.at >= v.route.len()
                } else {
                    false
                }
            };
            if done {
                self.vehicles.remove(&id);
                continue;
            }
            self.progress_taxi(id);
        }
    }

    fn progress_taxi(&mut self, id: VehicleId) {
        enum Transition {
            None,
            Board {
                customers:    Vec<PersonId>,
                pickup_edge:  EdgeId,
                ride_secs:    u32,
                dest_edge:    EdgeId,
                dest_parking: ParkingId,
            },
            Land {
                customers:    Vec<PersonId>,
                dest_edge:    EdgeId,
                dest_parking: ParkingId,
            },
        }

        let step_secs = self.step_secs;
        let transition = {
            let Some(v) = self.vehicles.get_mut(&id) else { return };
            let Duty::Taxi(phase) = &mut v.duty else { return };
            match phase {
                TaxiPhase::Parked { .. } => Transition::None,
                TaxiPhase::Pickup {
                    secs_left, customers, pickup_edge, dest_edge, ride_secs, dest_parking,
                } => {
                    *secs_left = secs_left.saturating_sub(step_secs);
                    if *secs_left == 0 {
                        Transition::Board {
                            customers:    std::mem::take(customers),
                            pickup_edge:  *pickup_edge,
                            ride_secs:    *ride_secs,
                            dest_edge:    *dest_edge,
                            dest_parking: *dest_parking,
                        }
                    } else {
                        Transition::None
                    }
                }
                TaxiPhase::Ride { secs_left, customers, dest_edge, dest_parking } => {
                    *secs_left = secs_left.saturating_sub(step_secs);
                    if *secs_left == 0 {
                        Transition::Land {
                            customers:    std::mem::take(customers),
                            dest_edge:    *dest_edge,
                            dest_parking: *dest_parking,
                        }
                    } else {
                        Transition::None
                    }
                }
            }
        };

        match transition {
            Transition::None => {}
            Transition::Board { customers, pickup_edge, ride_secs, dest_edge, dest_parking } => {
                for &p in &customers {
                    if let Some(person) = self.persons.get_mut(&p) {
                        person.vehicle = Some(id);
                        person.edge = pickup_edge;
                    }
                }
                if let Some(v) = self.vehicles.get_mut(&id) {
                    v.duty = Duty::Taxi(TaxiPhase::Ride {
                        secs_left: ride_secs,
                        customers,
                        dest_edge,
                        dest_parking,
                    });
                }
            }
            Transition::Land { customers, dest_edge, dest_parking } => {
                for &p in &customers {
                    if let Some(person) = self.persons.get_mut(&p) {
                        person.vehicle = None;
                        person.edge = dest_edge;
                        person.leg += 1;
                        person.edges_done = 0;
                    }
                }
                if let Some(v) = self.vehicles.get_mut(&id) {
                    v.duty = Duty::Taxi(TaxiPhase::Parked { parking: dest_parking });
                }
            }
        }
    }

    fn progress_persons(&mut self) {
        let ids: Vec<PersonId> = self.persons.keys().copied().collect();
        for id in ids {
            let mut issue: Option<(usize, EdgeId, EdgeId)> = None;
            let mut remove = false;
            {
                let person = self.persons.get_mut(&id).expect("collected id");
                if person.vehicle.is_some() {
                    continue; // riding; the taxi moves them
                }
                if person.leg >= person.plan.len() {
                    remove = true;
                } else {
                    let leg = &person.plan[person.leg];
                    match leg.mode {
                        LegMode::Walk => {
                            person.edges_done += 1;
                            if person.edges_done >= leg.edges.len() {
                                person.edge = leg.to;
                                person.leg += 1;
                                person.edges_done = 0;
                                if person.leg >= person.plan.len() {
                                    remove = true;
                                }
                            } else {
                                person.edge = leg.edges[person.edges_done];
                            }
                        }
                        LegMode::Taxi => {
                            if person.issued_leg != Some(person.leg) {
                                person.issued_leg = Some(person.leg);
                                issue = Some((person.leg, leg.from, leg.to));
                            }
                            // Otherwise: waiting at the hub for dispatch.
                        }
                    }
                }
            }
            if remove {
                self.persons.remove(&id);
                continue;
            }
            if let Some((_, from, to)) = issue {
                let rid = ReservationId(self.next_reservation);
                self.next_reservation += 1;
                let reservation = Reservation { id: rid, persons: vec![id], from, to };
                self.reservations.insert(rid, reservation.clone());
                self.fresh_reservations.push(reservation);
            }
        }
    }

    fn computed_lane_measurement(&self, lane: LaneRef) -> LaneMeasurement {
        let edge_len = self.net.edge_length_m(lane.edge).max(1.0);
        let mut total_len = 0.0f32;
        let mut count = 0usize;
        for v in self.vehicles.values() {
            if self.current_edge(v) == lane.edge && v.lane == lane.index {
                total_len += class_length_m(v.class);
                count += 1;
            }
        }
        LaneMeasurement {
            occupancy:           (total_len / edge_len).min(1.0),
            mean_speed:          self.net.edge_speed(lane.edge),
            mean_vehicle_length: if count == 0 { 0.0 } else { total_len / count as f32 },
        }
    }

    /// The boarding edge nearest to `pos`, by straight-line distance.
    fn nearest_boarding_edge(&self, pos: Point) -> Option<EdgeId> {
        self.boarding_edges
            .iter()
            .copied()
            .min_by(|&a, &b| {
                let da = self.net.edge_origin(a).distance(pos);
                let db = self.net.edge_origin(b).distance(pos);
                da.total_cmp(&db).then(a.cmp(&b))
            })
    }
}

// ── TrafficEngine impl ────────────────────────────────────────────────────────

impl TrafficEngine for SyntheticEngine {
    fn advance(&mut self) -> EngineResult<()> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        self.step += 1;
        self.progress_vehicles();
        self.progress_persons();
        self.spawn_due_demand();
        Ok(())
    }

    fn sim_secs(&self) -> f64 {
        self.step as f64 * self.step_secs as f64
    }

    fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    fn person_ids(&self) -> Vec<PersonId> {
        self.persons.keys().copied().collect()
    }

    fn vehicle_class(&self, v: VehicleId) -> EngineResult<VehicleClass> {
        Ok(self.vehicle(v)?.class)
    }

    fn vehicle_position(&self, v: VehicleId) -> EngineResult<Point> {
        let vehicle = self.vehicle(v)?;
        Ok(self.net.edge_origin(self.current_edge(vehicle)))
    }

    fn vehicle_lane(&self, v: VehicleId) -> EngineResult<LaneRef> {
        let vehicle = self.vehicle(v)?;
        Ok(LaneRef::new(self.current_edge(vehicle), vehicle.lane))
    }

    fn vehicle_route(&self, v: VehicleId) -> EngineResult<Vec<EdgeId>> {
        let vehicle = self.vehicle(v)?;
        Ok(match &vehicle.duty {
            Duty::Trip => vehicle.route.clone(),
            Duty::Taxi(_) => vec![self.current_edge(vehicle)],
        })
    }

    fn vehicle_passengers(&self, v: VehicleId) -> EngineResult<Vec<PersonId>> {
        let vehicle = self.vehicle(v)?;
        Ok(match &vehicle.duty {
            Duty::Taxi(TaxiPhase::Ride { customers, .. }) => customers.clone(),
            _ => vec![],
        })
    }

    fn add_vehicle(&mut self, class: VehicleClass, route: Vec<EdgeId>) -> EngineResult<VehicleId> {
        if route.is_empty() {
            return Err(EngineError::EmptyRoute);
        }
        let id = self.mint_vehicle();
        self.vehicles.insert(id, Vehicle {
            class,
            route,
            at: 0,
            lane: 0,
            lane_until_step: 0,
            duty: Duty::Trip,
            color: None,
        });
        Ok(id)
    }

    fn remove_vehicle(&mut self, v: VehicleId) -> EngineResult<()> {
        self.vehicles.remove(&v).map(|_| ()).ok_or(EngineError::UnknownVehicle(v))
    }

    fn change_lane(&mut self, v: VehicleId, lane: u8, duration_secs: u32) -> EngineResult<()> {
        let edge = {
            let vehicle = self.vehicle(v)?;
            self.current_edge(vehicle)
        };
        if lane >= self.net.lane_count(edge) {
            return Err(EngineError::InvalidLane { vehicle: v, lane });
        }
        let until = self.step + (duration_secs / self.step_secs.max(1)) as u64;
        let vehicle = self.vehicles.get_mut(&v).expect("checked above");
        vehicle.lane = lane;
        vehicle.lane_until_step = until;
        Ok(())
    }

    fn set_vehicle_color(&mut self, v: VehicleId, color: Rgba) {
        if let Some(vehicle) = self.vehicles.get_mut(&v) {
            vehicle.color = Some(color);
        }
    }

    fn person_position(&self, p: PersonId) -> EngineResult<Point> {
        let person = self.person(p)?;
        Ok(self.net.edge_origin(person.edge))
    }

    fn person_lane(&self, p: PersonId) -> EngineResult<LaneRef> {
        let person = self.person(p)?;
        // Pedestrians keep to the outermost lane that admits them.
        let lanes = self.net.lanes(person.edge);
        let index = lanes
            .iter()
            .rposition(|l| l.allowed.contains(VehicleClass::Pedestrian))
            .unwrap_or(0) as u8;
        Ok(LaneRef::new(person.edge, index))
    }

    fn person_vehicle(&self, p: PersonId) -> EngineResult<Option<VehicleId>> {
        Ok(self.person(p)?.vehicle)
    }

    fn add_person(&mut self, at: EdgeId, plan: Vec<PlanLeg>) -> EngineResult<PersonId> {
        let id = PersonId(self.next_person);
        self.next_person += 1;
        self.persons.insert(id, Person {
            edge:       at,
            plan,
            leg:        0,
            edges_done: 0,
            vehicle:    None,
            issued_leg: None,
            color:      None,
        });
        Ok(id)
    }

    fn set_person_color(&mut self, p: PersonId, color: Rgba) {
        if let Some(person) = self.persons.get_mut(&p) {
            person.color = Some(color);
        }
    }

    fn persons_on_edge(&self, edge: EdgeId) -> Vec<PersonId> {
        self.persons
            .iter()
            .filter(|(_, person)| person.vehicle.is_none() && person.edge == edge)
            .map(|(&id, _)| id)
            .collect()
    }

    fn direct_route(&self, from: EdgeId, to: EdgeId, class: VehicleClass) -> EngineResult<Vec<EdgeId>> {
        Ok(self
            .router
            .route(&self.net, from, to, class)
            .map(|r| r.edges)
            .unwrap_or_default())
    }

    fn intermodal_plan(&self, from: EdgeId, to: EdgeId) -> EngineResult<Vec<PlanLeg>> {
        let walk_direct = self.router.route(&self.net, from, to, VehicleClass::Pedestrian).ok();

        // Taxi option: walk to the nearest hub, fly, walk from the far hub.
        let taxi_option = (|| {
            let origin_hub = self.nearest_boarding_edge(self.net.edge_origin(from))?;
            let dest_hub   = self.nearest_boarding_edge(self.net.edge_origin(to))?;
            if origin_hub == dest_hub {
                return None;
            }
            let walk_in  = self.router.route(&self.net, from, origin_hub, VehicleClass::Pedestrian).ok()?;
            let flight   = self.router.route(&self.net, origin_hub, dest_hub, VehicleClass::Taxi).ok()?;
            let walk_out = self.router.route(&self.net, dest_hub, to, VehicleClass::Pedestrian).ok()?;
            let total = walk_in.travel_secs
                + self.pickup_secs as f32
                + flight.travel_secs
                + walk_out.travel_secs;
            Some((walk_in, flight, walk_out, origin_hub, dest_hub, total))
        })();

        match (walk_direct, taxi_option) {
            (Some(walk), Some((walk_in, flight, walk_out, origin_hub, dest_hub, total)))
                if total < walk.travel_secs =>
            {
                Ok(vec![
                    PlanLeg::walk(from, origin_hub, walk_in.edges, walk_in.travel_secs),
                    PlanLeg::taxi(origin_hub, dest_hub, flight.edges, flight.travel_secs),
                    PlanLeg::walk(dest_hub, to, walk_out.edges, walk_out.travel_secs),
                ])
            }
            (None, Some((walk_in, flight, walk_out, origin_hub, dest_hub, _))) => Ok(vec![
                PlanLeg::walk(from, origin_hub, walk_in.edges, walk_in.travel_secs),
                PlanLeg::taxi(origin_hub, dest_hub, flight.edges, flight.travel_secs),
                PlanLeg::walk(dest_hub, to, walk_out.edges, walk_out.travel_secs),
            ]),
            (Some(walk), _) => {
                Ok(vec![PlanLeg::walk(from, to, walk.edges, walk.travel_secs)])
            }
            (None, None) => Ok(vec![]),
        }
    }

    fn taxi_fleet(&self, state: TaxiState) -> Vec<VehicleId> {
        self.vehicles
            .iter()
            .filter(|(_, v)| Self::taxi_state(&v.duty) == Some(state))
            .map(|(&id, _)| id)
            .collect()
    }

    fn add_parked_taxi(&mut self, parking: ParkingId) -> EngineResult<VehicleId> {
        let edge = self.net.parking_edge(parking);
        let id = self.mint_vehicle();
        self.vehicles.insert(id, Vehicle {
            class:           VehicleClass::Taxi,
            route:           vec![edge],
            at:              0,
            lane:            0,
            lane_until_step: 0,
            duty:            Duty::Taxi(TaxiPhase::Parked { parking }),
            color:           None,
        });
        Ok(id)
    }

    fn dispatch_taxi(&mut self, taxi: VehicleId, reservations: &[ReservationId]) -> EngineResult<()> {
        let home_parking = match &self.vehicle(taxi)?.duty {
            Duty::Taxi(TaxiPhase::Parked { parking }) => *parking,
            _ => return Err(EngineError::NotIdle(taxi)),
        };

        let mut customers: Vec<PersonId> = Vec::new();
        let mut pickup_edge = EdgeId::INVALID;
        let mut dest_edge = EdgeId::INVALID;
        for &rid in reservations {
            let reservation = self
                .reservations
                .get(&rid)
                .ok_or(EngineError::UnknownReservation(rid))?;
            if !pickup_edge.is_valid() {
                pickup_edge = reservation.from;
                dest_edge = reservation.to;
            }
            for &p in &reservation.persons {
                if !customers.contains(&p) {
                    customers.push(p);
                }
            }
        }
        if !pickup_edge.is_valid() {
            return Err(EngineError::EmptyRoute);
        }
        for &rid in reservations {
            self.reservations.remove(&rid);
        }

        let taxi_pos = self.net.edge_origin(self.net.parking_edge(home_parking));
        let pickup_pos = self.net.edge_origin(pickup_edge);
        let approach_secs = (taxi_pos.distance(pickup_pos) / TAXI_CRUISE_MPS).ceil() as u32;

        let ride_secs = self
            .router
            .route(&self.net, pickup_edge, dest_edge, VehicleClass::Taxi)
            .map(|r| r.travel_secs.ceil() as u32)
            .unwrap_or_else(|_| {
                (pickup_pos.distance(self.net.edge_origin(dest_edge)) / TAXI_CRUISE_MPS).ceil()
                    as u32
            })
            .max(self.step_secs);

        let dest_parking = self
            .net
            .opposite(dest_edge)
            .and_then(|twin| {
                self.net
                    .parkings_on(twin)
                    .iter()
                    .copied()
                    .find(|&p| self.net.is_uam_hub(p))
            })
            .unwrap_or(home_parking);

        let vehicle = self.vehicles.get_mut(&taxi).expect("checked above");
        vehicle.duty = Duty::Taxi(TaxiPhase::Pickup {
            secs_left: (self.pickup_secs + approach_secs).max(self.step_secs),
            customers,
            pickup_edge,
            dest_edge,
            ride_secs,
            dest_parking,
        });
        Ok(())
    }

    fn drain_reservations(&mut self) -> Vec<Reservation> {
        std::mem::take(&mut self.fresh_reservations)
    }

    fn parking_occupants(&self, parking: ParkingId) -> Vec<VehicleId> {
        self.vehicles
            .iter()
            .filter(|(_, v)| {
                matches!(&v.duty, Duty::Taxi(TaxiPhase::Parked { parking: p }) if *p == parking)
            })
            .map(|(&id, _)| id)
            .collect()
    }

    fn lane_measurement(&self, lane: LaneRef) -> LaneMeasurement {
        self.lane_overrides
            .get(&lane)
            .copied()
            .unwrap_or_else(|| self.computed_lane_measurement(lane))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
