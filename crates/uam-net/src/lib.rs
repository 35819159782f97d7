//! `uam-net` — static network topology for the `rust_uam` control layer.
//!
//! The traffic engine owns the live traffic state; this crate owns everything
//! that never changes during a run: junction positions, directed edges with
//! their lane permission sets, the bidirectional edge pairing, the parking
//! registry (UAM hub pads included), a spatial index for radius queries, and
//! a class-aware shortest-path router.
//!
//! | Module      | Contents                                             |
//! |-------------|------------------------------------------------------|
//! | [`network`] | `NetworkModel`, `NetworkBuilder`, `Lane`, `EdgeKind` |
//! | [`router`]  | `EdgeRouter` trait, `DijkstraRouter`, `EdgeRoute`    |
//! | [`error`]   | `NetError`, `NetResult`                              |

pub mod error;
pub mod network;
pub mod router;


pub use error::{NetError, NetResult};
pub use network::{EdgeKind, Lane, NetworkBuilder, NetworkModel};
pub use router::{DijkstraRouter, EdgeRoute, EdgeRouter};
