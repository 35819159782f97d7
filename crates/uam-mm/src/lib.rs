//! `uam-mm` — the micromobility (e-scooter) layer.
//!
//! Scooters periodically re-rank the lanes of their current edge with a
//! comfort heuristic over occupancy, traffic speed, and vehicle size, and
//! hop to the best one.  A dedicated bicycle/scooter lane short-circuits the
//! heuristic entirely.  The proximity scan reports scooters passing close to
//! pedestrians for safety analysis.
//!
//! | Module        | Contents                                         |
//! |---------------|--------------------------------------------------|
//! | [`rating`]    | `LaneKind`, `classify`, `rate`, `preferred_lane` |
//! | [`selector`]  | `LaneSelector`, `LaneChange`                     |
//! | [`proximity`] | `close_encounters`, `Encounter`                  |

pub mod proximity;
pub mod rating;
pub mod selector;

#[cfg(test)]
mod tests;

pub use proximity::{Encounter, close_encounters};
pub use rating::{LaneKind, LaneObservation, NO_CANDIDATE_SCORE, RatingThresholds, classify, preferred_lane, rate};
pub use selector::{LaneChange, LaneSelector};
