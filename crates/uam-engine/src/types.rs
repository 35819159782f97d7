//! Plain data types exchanged with the traffic engine.

use uam_core::{EdgeId, PersonId, ReservationId};

// ── Rgba ─────────────────────────────────────────────────────────────────────

/// Display color for agents — cosmetic, only meaningful with a GUI attached.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    /// Idle taxis.
    pub const GREEN: Rgba = Rgba(0, 255, 0, 255);
    /// Taxis heading to a pickup.
    pub const CYAN: Rgba = Rgba(0, 255, 255, 255);
    /// Taxis carrying passengers.
    pub const RED: Rgba = Rgba(255, 0, 0, 255);
    /// Walk-only converted customers.
    pub const ORANGE: Rgba = Rgba(255, 123, 0, 255);
}

// ── TaxiState ─────────────────────────────────────────────────────────────────

/// The three disjoint fleet partitions the engine reports.
///
/// The control layer queries these fresh every step and never caches them
/// across steps.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum TaxiState {
    /// Parked, no pending reservation.
    Idle,
    /// Dispatched, travelling empty to a pickup.
    EnRoute,
    /// Carrying passengers.
    Occupied,
}

impl TaxiState {
    pub const ALL: [TaxiState; 3] = [TaxiState::Idle, TaxiState::EnRoute, TaxiState::Occupied];

    /// Label used in fleet log rows.
    pub fn as_str(self) -> &'static str {
        match self {
            TaxiState::Idle     => "idle",
            TaxiState::EnRoute  => "onRoute",
            TaxiState::Occupied => "occupied",
        }
    }
}

impl std::fmt::Display for TaxiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Reservation ───────────────────────────────────────────────────────────────

/// A taxi request issued by a pedestrian, as reported by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    /// The requesting party, in boarding order.  Engines issue one
    /// reservation per pedestrian; pooling happens in the control layer.
    pub persons: Vec<PersonId>,
    pub from: EdgeId,
    pub to:   EdgeId,
}

// ── Trip plans ────────────────────────────────────────────────────────────────

/// Travel mode of one leg of a pedestrian trip plan.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LegMode {
    Walk,
    Taxi,
}

/// One leg of a (possibly intermodal) pedestrian trip plan.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanLeg {
    pub mode: LegMode,
    pub from: EdgeId,
    pub to:   EdgeId,
    /// Edges traversed, including `from` and `to`.  Empty only for
    /// degenerate legs the engine already considers complete.
    pub edges: Vec<EdgeId>,
    /// Engine's travel-time estimate in seconds.
    pub travel_secs: f32,
}

impl PlanLeg {
    pub fn walk(from: EdgeId, to: EdgeId, edges: Vec<EdgeId>, travel_secs: f32) -> Self {
        Self { mode: LegMode::Walk, from, to, edges, travel_secs }
    }

    pub fn taxi(from: EdgeId, to: EdgeId, edges: Vec<EdgeId>, travel_secs: f32) -> Self {
        Self { mode: LegMode::Taxi, from, to, edges, travel_secs }
    }
}

// ── LaneMeasurement ───────────────────────────────────────────────────────────

/// Aggregate last-step measurements for one lane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct LaneMeasurement {
    /// Occupied fraction of the lane (0..=1) for road lanes; pedestrians per
    /// metre for sidewalks.
    pub occupancy: f32,
    /// Mean speed of traffic on the lane, m/s.
    pub mean_speed: f32,
    /// Mean vehicle length on the lane, metres.
    pub mean_vehicle_length: f32,
}
