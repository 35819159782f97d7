//! Error type for engine interactions.

use thiserror::Error;

use uam_core::{PersonId, ReservationId, VehicleId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("vehicle {0} is not known to the engine")]
    UnknownVehicle(VehicleId),

    #[error("person {0} is not known to the engine")]
    UnknownPerson(PersonId),

    #[error("reservation {0} is not known to the engine")]
    UnknownReservation(ReservationId),

    #[error("taxi {0} is not idle and cannot be dispatched")]
    NotIdle(VehicleId),

    #[error("vehicle {vehicle}: lane index {lane} does not exist on its edge")]
    InvalidLane { vehicle: VehicleId, lane: u8 },

    #[error("a vehicle route must contain at least one edge")]
    EmptyRoute,

    #[error("engine connection is closed")]
    Closed,
}

pub type EngineResult<T> = Result<T, EngineError>;
