//! `uam-core` — foundational types for the `rust_uam` control layer.
//!
//! This crate is a dependency of every other `uam-*` crate.  It intentionally
//! has no `uam-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `VehicleId`, `PersonId`, `JunctionId`, `EdgeId`, …        |
//! | [`geo`]     | `Point` (planar metres), Euclidean distance               |
//! | [`time`]    | `Step`, `StepClock`                                       |
//! | [`rng`]     | `SimRng` (process-wide deterministic generator)           |
//! | [`class`]   | `VehicleClass`, `ClassSet`                                |
//! | [`config`]  | `ControlConfig` and its sub-sections                      |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod class;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use class::{ClassSet, VehicleClass};
pub use config::{ControlConfig, ConversionConfig, ScooterConfig, UamConfig};
pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use ids::{EdgeId, JunctionId, LaneRef, ParkingId, PersonId, ReservationId, VehicleId};
pub use rng::SimRng;
pub use time::{Step, StepClock};
