//! Lifecycle records for converted agents.
//!
//! One record exists per live converted agent; it is created at conversion
//! and destroyed the step the agent disappears from the engine's live set.
//! Coordinates are rounded to whole metres — the resolution of the logs.

use uam_core::{Point, VehicleClass, VehicleId};

/// Where a UAM customer currently is in its journey.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TravelPhase {
    /// On foot (initial leg, walk-only trip, or after landing).
    Walking,
    /// Reservation issued, no taxi assigned yet.
    Waiting,
    /// Aboard a taxi.
    Flying,
}

/// Per-customer lifecycle record.
#[derive(Copy, Clone, Debug)]
pub struct CustomerRecord {
    pub origin: (i32, i32),
    pub dest:   (i32, i32),
    /// The trip vehicle this customer replaced.
    pub original: VehicleId,
    pub phase: TravelPhase,
}

impl CustomerRecord {
    pub fn new(origin: Point, dest: Point, original: VehicleId) -> Self {
        Self {
            origin: origin.rounded(),
            dest:   dest.rounded(),
            original,
            phase: TravelPhase::Walking,
        }
    }
}

/// Per-scooter lifecycle record.
#[derive(Copy, Clone, Debug)]
pub struct ScooterRecord {
    pub origin: (i32, i32),
    pub dest:   (i32, i32),
    /// The trip vehicle this scooter replaced (the scooter itself for
    /// engine-spawned scooters the controller adopted).
    pub original:       VehicleId,
    pub original_class: VehicleClass,
}

impl ScooterRecord {
    pub fn new(origin: Point, dest: Point, original: VehicleId, original_class: VehicleClass) -> Self {
        Self {
            origin: origin.rounded(),
            dest:   dest.rounded(),
            original,
            original_class,
        }
    }
}
