//! Scooter–pedestrian proximity scan.

use uam_core::{LaneRef, PersonId, Point, VehicleId};
use uam_engine::{EngineResult, LaneMeasurement, TrafficEngine};

/// One scooter passing close to a pedestrian on the same lane.
#[derive(Clone, Debug)]
pub struct Encounter {
    pub scooter:     VehicleId,
    pub scooter_pos: Point,
    pub person:      PersonId,
    pub person_pos:  Point,
    pub distance_m:  f32,
    pub lane:        LaneRef,
    pub measurement: LaneMeasurement,
}

/// All pedestrians within `threshold_m` of `scooter` on the scooter's
/// current lane.  Pedestrians on other lanes of the same edge don't count.
pub fn close_encounters<E: TrafficEngine>(
    engine:      &E,
    scooter:     VehicleId,
    threshold_m: f32,
) -> EngineResult<Vec<Encounter>> {
    let lane = engine.vehicle_lane(scooter)?;
    let scooter_pos = engine.vehicle_position(scooter)?;
    let measurement = engine.lane_measurement(lane);

    let mut encounters = Vec::new();
    for person in engine.persons_on_edge(lane.edge) {
        let Ok(person_lane) = engine.person_lane(person) else {
            continue;
        };
        if person_lane != lane {
            continue;
        }
        let Ok(person_pos) = engine.person_position(person) else {
            continue;
        };
        let distance_m = scooter_pos.distance(person_pos);
        if distance_m <= threshold_m {
            encounters.push(Encounter {
                scooter,
                scooter_pos,
                person,
                person_pos,
                distance_m,
                lane,
                measurement,
            });
        }
    }
    Ok(encounters)
}
