//! The `RowSink` trait implemented by all log backends.

use crate::row::{CustomerRow, EncounterRow, LaneEventRow, TaxiRow};
use crate::OutputResult;

/// A backend accepting the four event streams.
///
/// Implementations append rows in call order and never rewrite; `finish`
/// flushes and closes and must be idempotent.
pub trait RowSink {
    fn write_customer(&mut self, row: &CustomerRow) -> OutputResult<()>;

    fn write_taxi(&mut self, row: &TaxiRow) -> OutputResult<()>;

    fn write_lane_event(&mut self, row: &LaneEventRow) -> OutputResult<()>;

    fn write_encounter(&mut self, row: &EncounterRow) -> OutputResult<()>;

    /// Flush and close all underlying resources.  Safe to call repeatedly.
    fn finish(&mut self) -> OutputResult<()>;
}
