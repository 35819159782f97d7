//! `uam-output` — event log sinks for the control layer.
//!
//! Four append-only, semicolon-delimited streams record a run:
//!
//! | Stream       | One row per                                    |
//! |--------------|------------------------------------------------|
//! | `customers`  | UAM customer lifecycle event                   |
//! | `taxis`      | taxi per step (fleet state snapshot)           |
//! | `lane_events`| scooter conversion / lane selection / removal  |
//! | `encounters` | close scooter–pedestrian pass                  |
//!
//! Backends implement [`RowSink`]; CSV is always available, SQLite behind
//! the `sqlite` feature.  [`ControlLog`] wraps any sink with the control
//! loop's failure contract: a failed write warns on the console once, keeps
//! the first error for inspection after the run, and never aborts the tick.
//!
//! # Usage
//!
//! ```rust,ignore
//! let sink = CsvSink::new(Path::new("./results"), "citygrid")?;
//! let mut log = ControlLog::new(sink);
//! log.customer(&row);                   // infallible at the call site
//! log.finish();
//! if let Some(e) = log.take_error() { eprintln!("log error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod log;
pub mod row;
pub mod sink;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvSink;
pub use error::{OutputError, OutputResult};
pub use log::ControlLog;
pub use row::{CustomerEvent, CustomerRow, EncounterRow, LaneEventRow, ScooterEvent, TaxiRow};
pub use sink::RowSink;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;
