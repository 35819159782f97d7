//! `uam-control` — the per-step control loop.
//!
//! One [`StepController`] owns the engine connection and runs the fixed
//! stage order every tick:
//!
//! ```text
//! ① advance engine          ② snapshot + diff live sets
//! ③ report terminations     ④ conversions (UAM, then scooter)
//! ⑤ lane selection + proximity scan (periodic)
//! ⑥ pool aging → new reservations → dispatch
//! ⑦ fleet recoloring (display only)
//! ⑧ fleet log + flight transitions      ⑨ persist last-step sets
//! ```
//!
//! Later stages depend on earlier ones' side effects; the order is part of
//! the contract.  Everything is single-threaded and synchronous — all state
//! is owned by the controller for the duration of a tick.
//!
//! | Module         | Contents                                   |
//! |----------------|--------------------------------------------|
//! | [`controller`] | `StepController`, `StepStats`, `RunSummary`|
//! | [`records`]    | `CustomerRecord`, `ScooterRecord`          |
//! | [`observer`]   | `StepObserver`, `NoopObserver`             |
//! | [`error`]      | `ControlError`, `ControlResult`            |

pub mod controller;
pub mod error;
pub mod observer;
pub mod records;


pub use controller::{RunSummary, StepController, StepStats};
pub use error::{ControlError, ControlResult};
pub use observer::{NoopObserver, StepObserver};
pub use records::{CustomerRecord, ScooterRecord, TravelPhase};
