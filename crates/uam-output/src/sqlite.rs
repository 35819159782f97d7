//! SQLite log backend (feature `sqlite`).
//!
//! Creates a single `events.db` in the output directory with one table per
//! stream.  Column sets mirror the CSV headers.

use std::path::Path;

use rusqlite::Connection;

use crate::row::{CustomerRow, EncounterRow, LaneEventRow, TaxiRow};
use crate::sink::RowSink;
use crate::OutputResult;

/// Writes the four event streams into an SQLite database.
pub struct SqliteSink {
    scenario: String,
    conn:     Connection,
    finished: bool,
}

impl SqliteSink {
    /// Open (or create) `events.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path, scenario: &str) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("events.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS customers (
                 step               INTEGER NOT NULL,
                 sim_secs           INTEGER NOT NULL,
                 scenario           TEXT    NOT NULL,
                 person             INTEGER,
                 vehicle            INTEGER,
                 event              TEXT    NOT NULL,
                 x                  INTEGER,
                 y                  INTEGER,
                 route_start_x      INTEGER NOT NULL,
                 route_start_y      INTEGER NOT NULL,
                 route_dest_x       INTEGER NOT NULL,
                 route_dest_y       INTEGER NOT NULL,
                 original_vehicle   INTEGER NOT NULL,
                 uam_density        REAL    NOT NULL,
                 mm_density         REAL    NOT NULL,
                 vehicles_per_hub   INTEGER NOT NULL,
                 vehicle_capacity   INTEGER NOT NULL,
                 group_finding_secs INTEGER NOT NULL,
                 hub_count          INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS taxis (
                 step            INTEGER NOT NULL,
                 sim_secs        INTEGER NOT NULL,
                 scenario        TEXT    NOT NULL,
                 vehicle         INTEGER NOT NULL,
                 state           TEXT    NOT NULL,
                 x               INTEGER NOT NULL,
                 y               INTEGER NOT NULL,
                 passenger_count INTEGER NOT NULL,
                 customers       TEXT,
                 hub_count       INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS lane_events (
                 step                INTEGER NOT NULL,
                 sim_secs            INTEGER NOT NULL,
                 scenario            TEXT    NOT NULL,
                 scooter             INTEGER,
                 x                   INTEGER,
                 y                   INTEGER,
                 lane_kind           TEXT,
                 occupancy           REAL,
                 mean_speed          REAL,
                 mean_vehicle_length REAL,
                 route_start_x       INTEGER NOT NULL,
                 route_start_y       INTEGER NOT NULL,
                 route_dest_x        INTEGER NOT NULL,
                 route_dest_y        INTEGER NOT NULL,
                 original_vehicle    INTEGER NOT NULL,
                 original_class      TEXT    NOT NULL,
                 event               TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS encounters (
                 step                INTEGER NOT NULL,
                 sim_secs            INTEGER NOT NULL,
                 scenario            TEXT    NOT NULL,
                 scooter             INTEGER NOT NULL,
                 scooter_x           REAL    NOT NULL,
                 scooter_y           REAL    NOT NULL,
                 person              INTEGER NOT NULL,
                 ped_x               REAL    NOT NULL,
                 ped_y               REAL    NOT NULL,
                 distance            REAL    NOT NULL,
                 occupancy           REAL    NOT NULL,
                 mean_speed          REAL    NOT NULL,
                 mean_vehicle_length REAL    NOT NULL,
                 distance_threshold  REAL    NOT NULL
             );",
        )?;

        Ok(Self { scenario: scenario.to_owned(), conn, finished: false })
    }
}

impl RowSink for SqliteSink {
    fn write_customer(&mut self, row: &CustomerRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO customers VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        )?;
        stmt.execute(rusqlite::params![
            row.step,
            row.sim_secs,
            self.scenario,
            row.person.map(|p| p.0),
            row.vehicle.map(|v| v.0),
            row.event.as_str(),
            row.position.map(|p| p.0),
            row.position.map(|p| p.1),
            row.route_start.0,
            row.route_start.1,
            row.route_dest.0,
            row.route_dest.1,
            row.original.0,
            row.uam_density,
            row.mm_density,
            row.vehicles_per_hub,
            row.vehicle_capacity as i64,
            row.group_finding_secs,
            row.hub_count as i64,
        ])?;
        Ok(())
    }

    fn write_taxi(&mut self, row: &TaxiRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO taxis VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        stmt.execute(rusqlite::params![
            row.step,
            row.sim_secs,
            self.scenario,
            row.taxi.0,
            row.state.as_str(),
            row.position.0,
            row.position.1,
            row.passenger_count as i64,
            row.customers,
            row.hub_count as i64,
        ])?;
        Ok(())
    }

    fn write_lane_event(&mut self, row: &LaneEventRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO lane_events VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        )?;
        stmt.execute(rusqlite::params![
            row.step,
            row.sim_secs,
            self.scenario,
            row.scooter.map(|s| s.0),
            row.position.map(|p| p.0),
            row.position.map(|p| p.1),
            row.lane_kind,
            row.measurement.map(|m| m.occupancy as f64),
            row.measurement.map(|m| m.mean_speed as f64),
            row.measurement.map(|m| m.mean_vehicle_length as f64),
            row.route_start.0,
            row.route_start.1,
            row.route_dest.0,
            row.route_dest.1,
            row.original.0,
            row.original_class.as_str(),
            row.event.as_str(),
        ])?;
        Ok(())
    }

    fn write_encounter(&mut self, row: &EncounterRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO encounters VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;
        stmt.execute(rusqlite::params![
            row.step,
            row.sim_secs,
            self.scenario,
            row.scooter.0,
            row.scooter_pos.0 as f64,
            row.scooter_pos.1 as f64,
            row.person.0,
            row.person_pos.0 as f64,
            row.person_pos.1 as f64,
            row.distance_m as f64,
            row.measurement.occupancy as f64,
            row.measurement.mean_speed as f64,
            row.measurement.mean_vehicle_length as f64,
            row.threshold_m as f64,
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
