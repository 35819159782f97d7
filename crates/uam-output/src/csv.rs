//! CSV log backend.
//!
//! Creates four semicolon-delimited files in the output directory:
//! `customers.csv`, `taxis.csv`, `lane_events.csv`, `encounters.csv`.
//! Each gets its fixed header exactly once, at open.

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::row::{CustomerRow, EncounterRow, LaneEventRow, TaxiRow};
use crate::sink::RowSink;
use crate::OutputResult;

/// Render an optional value, `NULL` when absent.
fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "NULL".to_owned(), |v| v.to_string())
}

fn opt_pair(value: Option<(i32, i32)>) -> (String, String) {
    match value {
        Some((x, y)) => (x.to_string(), y.to_string()),
        None => ("NULL".to_owned(), "NULL".to_owned()),
    }
}

/// Writes the four event streams as semicolon-delimited CSV.
pub struct CsvSink {
    scenario:    String,
    customers:   Writer<File>,
    taxis:       Writer<File>,
    lane_events: Writer<File>,
    encounters:  Writer<File>,
    finished:    bool,
}

impl CsvSink {
    /// Open (or create) the four files in `dir` and write the header rows.
    /// `scenario` is stamped into every row.
    pub fn new(dir: &Path, scenario: &str) -> OutputResult<Self> {
        let open = |name: &str| -> OutputResult<Writer<File>> {
            Ok(WriterBuilder::new()
                .delimiter(b';')
                .from_path(dir.join(name))?)
        };

        let mut customers = open("customers.csv")?;
        customers.write_record([
            "step", "sim_secs", "scenario", "person", "vehicle", "event", "x", "y",
            "route_start_x", "route_start_y", "route_dest_x", "route_dest_y",
            "original_vehicle", "uam_density", "mm_density", "vehicles_per_hub",
            "vehicle_capacity", "group_finding_secs", "hub_count",
        ])?;

        let mut taxis = open("taxis.csv")?;
        taxis.write_record([
            "step", "sim_secs", "scenario", "vehicle", "state", "x", "y",
            "passenger_count", "customers", "hub_count",
        ])?;

        let mut lane_events = open("lane_events.csv")?;
        lane_events.write_record([
            "step", "sim_secs", "scenario", "scooter", "x", "y", "lane_kind",
            "occupancy", "mean_speed", "mean_vehicle_length",
            "route_start_x", "route_start_y", "route_dest_x", "route_dest_y",
            "original_vehicle", "original_class", "uam_density", "mm_density",
            "lane_change_secs", "lane_find_period_secs",
            "sidewalk_occupancy_threshold", "road_occupancy_threshold",
            "road_speed_threshold", "road_vehicle_length_threshold", "event",
        ])?;

        let mut encounters = open("encounters.csv")?;
        encounters.write_record([
            "step", "sim_secs", "scenario", "scooter", "scooter_x", "scooter_y",
            "person", "ped_x", "ped_y", "distance", "occupancy", "mean_speed",
            "mean_vehicle_length", "distance_threshold",
        ])?;

        Ok(Self {
            scenario: scenario.to_owned(),
            customers,
            taxis,
            lane_events,
            encounters,
            finished: false,
        })
    }
}

impl RowSink for CsvSink {
    fn write_customer(&mut self, row: &CustomerRow) -> OutputResult<()> {
        let (x, y) = opt_pair(row.position);
        self.customers.write_record(&[
            row.step.to_string(),
            row.sim_secs.to_string(),
            self.scenario.clone(),
            opt(row.person),
            opt(row.vehicle),
            row.event.as_str().to_owned(),
            x,
            y,
            row.route_start.0.to_string(),
            row.route_start.1.to_string(),
            row.route_dest.0.to_string(),
            row.route_dest.1.to_string(),
            row.original.to_string(),
            row.uam_density.to_string(),
            row.mm_density.to_string(),
            row.vehicles_per_hub.to_string(),
            row.vehicle_capacity.to_string(),
            row.group_finding_secs.to_string(),
            row.hub_count.to_string(),
        ])?;
        Ok(())
    }

    fn write_taxi(&mut self, row: &TaxiRow) -> OutputResult<()> {
        self.taxis.write_record(&[
            row.step.to_string(),
            row.sim_secs.to_string(),
            self.scenario.clone(),
            row.taxi.to_string(),
            row.state.as_str().to_owned(),
            row.position.0.to_string(),
            row.position.1.to_string(),
            row.passenger_count.to_string(),
            opt(row.customers.clone()),
            row.hub_count.to_string(),
        ])?;
        Ok(())
    }

    fn write_lane_event(&mut self, row: &LaneEventRow) -> OutputResult<()> {
        let (x, y) = opt_pair(row.position);
        let (occupancy, speed, length) = match row.measurement {
            Some(m) => (
                format!("{:.4}", m.occupancy),
                format!("{:.4}", m.mean_speed),
                format!("{:.4}", m.mean_vehicle_length),
            ),
            None => ("NULL".to_owned(), "NULL".to_owned(), "NULL".to_owned()),
        };
        self.lane_events.write_record(&[
            row.step.to_string(),
            row.sim_secs.to_string(),
            self.scenario.clone(),
            opt(row.scooter),
            x,
            y,
            opt(row.lane_kind),
            occupancy,
            speed,
            length,
            row.route_start.0.to_string(),
            row.route_start.1.to_string(),
            row.route_dest.0.to_string(),
            row.route_dest.1.to_string(),
            row.original.to_string(),
            row.original_class.as_str().to_owned(),
            row.uam_density.to_string(),
            row.mm_density.to_string(),
            row.lane_change_secs.to_string(),
            row.lane_find_period_secs.to_string(),
            row.sidewalk_occupancy_threshold.to_string(),
            row.road_occupancy_threshold.to_string(),
            row.road_speed_threshold.to_string(),
            row.road_length_threshold.to_string(),
            row.event.as_str().to_owned(),
        ])?;
        Ok(())
    }

    fn write_encounter(&mut self, row: &EncounterRow) -> OutputResult<()> {
        self.encounters.write_record(&[
            row.step.to_string(),
            row.sim_secs.to_string(),
            self.scenario.clone(),
            row.scooter.to_string(),
            format!("{:.4}", row.scooter_pos.0),
            format!("{:.4}", row.scooter_pos.1),
            row.person.to_string(),
            format!("{:.4}", row.person_pos.0),
            format!("{:.4}", row.person_pos.1),
            format!("{:.4}", row.distance_m),
            format!("{:.4}", row.measurement.occupancy),
            format!("{:.4}", row.measurement.mean_speed),
            format!("{:.4}", row.measurement.mean_vehicle_length),
            row.threshold_m.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.customers.flush()?;
        self.taxis.flush()?;
        self.lane_events.flush()?;
        self.encounters.flush()?;
        Ok(())
    }
}
