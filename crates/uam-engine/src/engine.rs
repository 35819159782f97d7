//! The `TrafficEngine` capability trait.

use uam_core::{EdgeId, LaneRef, ParkingId, PersonId, Point, ReservationId, VehicleClass, VehicleId};

use crate::error::EngineResult;
use crate::types::{LaneMeasurement, PlanLeg, Reservation, Rgba, TaxiState};

/// Everything the control layer is allowed to ask of the simulation engine.
///
/// This is a capability contract, not a wire protocol: a production backend
/// wraps its client library behind this trait; tests and demos use
/// [`SyntheticEngine`][crate::SyntheticEngine].
///
/// # Blocking model
///
/// All calls are synchronous.  [`advance`][Self::advance] blocks for the
/// duration of one simulation step; every other call is a cheap state query
/// or command against the engine's current step.
///
/// # Query failures
///
/// Queries about individual agents fail with `Unknown*` errors once the
/// agent has left the simulation.  Callers in the per-step loop treat such
/// failures as skippable (the agent will show up in the next termination
/// diff); only [`advance`][Self::advance] failures are fatal.
pub trait TrafficEngine {
    // ── Stepping ──────────────────────────────────────────────────────────

    /// Advance the simulation by exactly one step.
    fn advance(&mut self) -> EngineResult<()>;

    /// Simulated seconds since the start of the run.
    fn sim_secs(&self) -> f64;

    // ── Live agent sets ───────────────────────────────────────────────────

    /// All live vehicle ids, in ascending id order.
    fn vehicle_ids(&self) -> Vec<VehicleId>;

    /// All live pedestrian ids, in ascending id order.
    fn person_ids(&self) -> Vec<PersonId>;

    // ── Vehicle queries & commands ────────────────────────────────────────

    fn vehicle_class(&self, v: VehicleId) -> EngineResult<VehicleClass>;

    fn vehicle_position(&self, v: VehicleId) -> EngineResult<Point>;

    fn vehicle_lane(&self, v: VehicleId) -> EngineResult<LaneRef>;

    /// The vehicle's planned route (remaining edges included).
    fn vehicle_route(&self, v: VehicleId) -> EngineResult<Vec<EdgeId>>;

    /// Passengers currently aboard (empty for anything but occupied taxis).
    fn vehicle_passengers(&self, v: VehicleId) -> EngineResult<Vec<PersonId>>;

    /// Insert a vehicle that follows `route` from its first edge.
    fn add_vehicle(&mut self, class: VehicleClass, route: Vec<EdgeId>) -> EngineResult<VehicleId>;

    /// Remove a vehicle from the simulation immediately.
    fn remove_vehicle(&mut self, v: VehicleId) -> EngineResult<()>;

    /// Pin `v` to lane `lane` of its current edge for `duration_secs`.
    fn change_lane(&mut self, v: VehicleId, lane: u8, duration_secs: u32) -> EngineResult<()>;

    /// Recolor a vehicle for display purposes.  Unknown ids are ignored.
    fn set_vehicle_color(&mut self, v: VehicleId, color: Rgba);

    // ── Pedestrian queries & commands ─────────────────────────────────────

    fn person_position(&self, p: PersonId) -> EngineResult<Point>;

    fn person_lane(&self, p: PersonId) -> EngineResult<LaneRef>;

    /// The vehicle the person currently rides, or `None` while on foot or
    /// waiting.  The waiting→flying and flying→done lifecycle transitions
    /// are detected from this field alone.
    fn person_vehicle(&self, p: PersonId) -> EngineResult<Option<VehicleId>>;

    /// Insert a pedestrian at the start of `at`, executing `plan` in order.
    fn add_person(&mut self, at: EdgeId, plan: Vec<PlanLeg>) -> EngineResult<PersonId>;

    /// Recolor a pedestrian for display purposes.  Unknown ids are ignored.
    fn set_person_color(&mut self, p: PersonId, color: Rgba);

    /// Pedestrians currently on `edge` (not riding a vehicle).
    fn persons_on_edge(&self, edge: EdgeId) -> Vec<PersonId>;

    // ── Routing services ──────────────────────────────────────────────────

    /// Mode-specific shortest route.  An empty vec means unreachable.
    fn direct_route(&self, from: EdgeId, to: EdgeId, class: VehicleClass)
    -> EngineResult<Vec<EdgeId>>;

    /// Best walk+taxi plan.  One leg means walking beats the taxi; an empty
    /// vec means no plan exists at all.
    fn intermodal_plan(&self, from: EdgeId, to: EdgeId) -> EngineResult<Vec<PlanLeg>>;

    // ── Taxi fleet ────────────────────────────────────────────────────────

    /// Taxis currently in the given fleet partition, ascending id order.
    fn taxi_fleet(&self, state: TaxiState) -> Vec<VehicleId>;

    /// Seed one taxi parked at `parking`.
    fn add_parked_taxi(&mut self, parking: ParkingId) -> EngineResult<VehicleId>;

    /// Send `taxi` to serve the given reservations as one tour.
    fn dispatch_taxi(&mut self, taxi: VehicleId, reservations: &[ReservationId])
    -> EngineResult<()>;

    /// Take the reservations issued since the last drain.
    fn drain_reservations(&mut self) -> Vec<Reservation>;

    // ── Parking & lane measurements ───────────────────────────────────────

    /// Vehicles currently parked at `parking`, ascending id order.
    fn parking_occupants(&self, parking: ParkingId) -> Vec<VehicleId>;

    /// Aggregate last-step measurements for one lane.
    fn lane_measurement(&self, lane: LaneRef) -> LaneMeasurement;

    // ── Teardown ──────────────────────────────────────────────────────────

    /// Close the engine connection.  Further `advance` calls fail.
    fn close(&mut self);
}
