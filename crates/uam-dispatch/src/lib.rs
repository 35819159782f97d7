//! `uam-dispatch` — reservation pooling and taxi selection.
//!
//! Pedestrian taxi requests sharing an (origin, destination) pair are pooled
//! so one air taxi serves the whole party.  The [`ReservationPool`] does the
//! bookkeeping; the [`DispatchPolicy`] decides when a pool is ready (wait
//! long enough, or party large enough) and which idle taxi serves it.
//!
//! | Module     | Contents                                      |
//! |------------|-----------------------------------------------|
//! | [`pool`]   | `ReservationPool`, `PoolKey`, `PoolEntry`     |
//! | [`policy`] | `DispatchPolicy`, `Dispatched`                |

pub mod policy;
pub mod pool;

#[cfg(test)]
mod tests;

pub use policy::{DispatchPolicy, Dispatched};
pub use pool::{PoolEntry, PoolKey, ReservationPool};
