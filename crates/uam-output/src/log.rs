//! `ControlLog` — the failure-capturing wrapper around a sink.
//!
//! The control loop must never abort a tick because a log row failed to
//! write.  `ControlLog` makes every record call infallible at the call site:
//! the first sink error is kept for inspection after the run, a console
//! warning is printed once, and subsequent rows are attempted regardless.

use crate::row::{CustomerRow, EncounterRow, LaneEventRow, TaxiRow};
use crate::sink::RowSink;
use crate::{OutputError, OutputResult};

pub struct ControlLog<S: RowSink> {
    sink:       S,
    last_error: Option<OutputError>,
    /// Rows lost to sink failures.
    lost_rows: usize,
    /// Rows skipped because the agent's lifecycle record was missing.
    skipped_rows: usize,
    warned: bool,
}

impl<S: RowSink> ControlLog<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_error:   None,
            lost_rows:    0,
            skipped_rows: 0,
            warned:       false,
        }
    }

    pub fn customer(&mut self, row: &CustomerRow) {
        let result = self.sink.write_customer(row);
        self.absorb(result);
    }

    pub fn taxi(&mut self, row: &TaxiRow) {
        let result = self.sink.write_taxi(row);
        self.absorb(result);
    }

    pub fn lane_event(&mut self, row: &LaneEventRow) {
        let result = self.sink.write_lane_event(row);
        self.absorb(result);
    }

    pub fn encounter(&mut self, row: &EncounterRow) {
        let result = self.sink.write_encounter(row);
        self.absorb(result);
    }

    /// Note a row that could not be built because no lifecycle record
    /// exists for `what` — the row is dropped, the run continues.
    pub fn skip_missing_record(&mut self, what: impl std::fmt::Display) {
        self.skipped_rows += 1;
        eprintln!("warning: no lifecycle record for {what}; log row not written");
    }

    /// Flush the sink; errors are absorbed like row errors.
    pub fn finish(&mut self) {
        let result = self.sink.finish();
        self.absorb(result);
    }

    /// The first sink error encountered, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn lost_rows(&self) -> usize {
        self.lost_rows
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    fn absorb(&mut self, result: OutputResult<()>) {
        let Err(e) = result else { return };
        self.lost_rows += 1;
        if !self.warned {
            self.warned = true;
            eprintln!("warning: log sink failure, rows may be lost: {e}");
        }
        // Keep only the first error.
        if self.last_error.is_none() {
            self.last_error = Some(e);
        }
    }
}
