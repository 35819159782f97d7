//! Plain data row types written by log backends.
//!
//! Rows carry run-level tunables (densities, thresholds, hub count) so each
//! stream is self-describing when runs are concatenated for analysis.

use uam_core::{PersonId, VehicleClass, VehicleId};
use uam_engine::{LaneMeasurement, TaxiState};

// ── Event tags ────────────────────────────────────────────────────────────────

/// Lifecycle event of a UAM customer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CustomerEvent {
    /// Reservation issued, no taxi assigned yet.
    Waiting,
    /// The engine reports an assigned taxi.
    Flying,
    /// Converted with a full intermodal plan (initial walking segment), or
    /// back on foot after a completed flight.
    Walking,
    /// Converted, but the taxi offered no benefit — the whole trip is walked.
    OnlyWalking,
    /// Conversion abandoned: no usable plan between the endpoints.
    NoRoute,
    /// Conversion abandoned: an endpoint rejected the mode and no
    /// substitute edge existed within the search radius.
    NoAlternative,
    /// The customer left the simulation.
    Terminated,
}

impl CustomerEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            CustomerEvent::Waiting       => "waiting",
            CustomerEvent::Flying        => "flying",
            CustomerEvent::Walking       => "walking",
            CustomerEvent::OnlyWalking   => "onlyWalking",
            CustomerEvent::NoRoute       => "noRoute",
            CustomerEvent::NoAlternative => "noAlternative",
            CustomerEvent::Terminated    => "terminated",
        }
    }
}

/// Lifecycle / lane event of a converted scooter.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ScooterEvent {
    /// Scooter created from a converted trip.
    New,
    /// The lane selector commanded a change.
    LaneSelection,
    NoRoute,
    NoAlternative,
    Terminated,
}

impl ScooterEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            ScooterEvent::New           => "new",
            ScooterEvent::LaneSelection => "laneSelection",
            ScooterEvent::NoRoute       => "noRoute",
            ScooterEvent::NoAlternative => "noAlternative",
            ScooterEvent::Terminated    => "terminated",
        }
    }
}

// ── Rows ─────────────────────────────────────────────────────────────────────

/// One UAM customer lifecycle event.
#[derive(Clone, Debug)]
pub struct CustomerRow {
    pub step:     u64,
    pub sim_secs: u64,
    /// Absent for abandoned conversions — no pedestrian was ever created.
    pub person: Option<PersonId>,
    /// Assigned taxi, when the event has one (flight start).
    pub vehicle: Option<VehicleId>,
    pub event:   CustomerEvent,
    /// Current position, metres, absent once the agent is gone.
    pub position: Option<(i32, i32)>,
    pub route_start: (i32, i32),
    pub route_dest:  (i32, i32),
    /// The trip vehicle this customer replaced.
    pub original: VehicleId,
    // Run tunables.
    pub uam_density:        f64,
    pub mm_density:         f64,
    pub vehicles_per_hub:   u32,
    pub vehicle_capacity:   usize,
    pub group_finding_secs: u32,
    pub hub_count:          usize,
}

/// One taxi fleet-state snapshot row (per taxi, per step).
#[derive(Clone, Debug)]
pub struct TaxiRow {
    pub step:     u64,
    pub sim_secs: u64,
    pub taxi:     VehicleId,
    pub state:    TaxiState,
    pub position: (i32, i32),
    pub passenger_count: usize,
    /// Customer ids aboard, `-`-joined; `None` when empty.
    pub customers: Option<String>,
    pub hub_count: usize,
}

/// One scooter lifecycle or lane-selection event.
#[derive(Clone, Debug)]
pub struct LaneEventRow {
    pub step:     u64,
    pub sim_secs: u64,
    /// Absent for abandoned conversions — no scooter was ever created.
    pub scooter:  Option<VehicleId>,
    pub position: Option<(i32, i32)>,
    /// Winning lane kind label — only for lane-selection events.
    pub lane_kind: Option<&'static str>,
    /// Winning lane measurements — only for lane-selection events.
    pub measurement: Option<LaneMeasurement>,
    pub route_start: (i32, i32),
    pub route_dest:  (i32, i32),
    pub original:       VehicleId,
    pub original_class: VehicleClass,
    // Run tunables.
    pub uam_density:           f64,
    pub mm_density:            f64,
    pub lane_change_secs:      u32,
    pub lane_find_period_secs: u32,
    pub sidewalk_occupancy_threshold: f32,
    pub road_occupancy_threshold:     f32,
    pub road_speed_threshold:         f32,
    pub road_length_threshold:        f32,
    pub event: ScooterEvent,
}

/// One close scooter–pedestrian pass.
#[derive(Clone, Debug)]
pub struct EncounterRow {
    pub step:        u64,
    pub sim_secs:    u64,
    pub scooter:     VehicleId,
    pub scooter_pos: (f32, f32),
    pub person:      PersonId,
    pub person_pos:  (f32, f32),
    pub distance_m:  f32,
    pub measurement: LaneMeasurement,
    pub threshold_m: f32,
}
