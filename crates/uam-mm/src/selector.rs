//! Per-scooter lane selection.

use uam_core::{LaneRef, ScooterConfig, VehicleId};
use uam_engine::{EngineResult, LaneMeasurement, TrafficEngine};
use uam_net::NetworkModel;

use crate::rating::{LaneKind, LaneObservation, RatingThresholds, classify, preferred_lane};

/// An executed lane change, carrying the winning lane's data for logging.
#[derive(Clone, Debug)]
pub struct LaneChange {
    pub scooter:     VehicleId,
    pub lane:        LaneRef,
    pub kind:        LaneKind,
    pub measurement: LaneMeasurement,
}

/// Re-ranks the lanes of a scooter's current edge and issues the lane-change
/// command for the winner.
pub struct LaneSelector {
    thresholds:       RatingThresholds,
    lane_change_secs: u32,
}

impl LaneSelector {
    pub fn new(cfg: &ScooterConfig) -> Self {
        Self {
            thresholds:       RatingThresholds::from(cfg),
            lane_change_secs: cfg.lane_change_secs,
        }
    }

    /// Evaluate one scooter.  Returns the change that was commanded, or
    /// `None` when the edge has a single lane or no lane beats the
    /// no-candidate sentinel.
    ///
    /// A dedicated bicycle/scooter lane among the candidates is taken
    /// unconditionally, without consulting the rating table.
    pub fn select_for<E: TrafficEngine>(
        &self,
        net:     &NetworkModel,
        engine:  &mut E,
        scooter: VehicleId,
    ) -> EngineResult<Option<LaneChange>> {
        let current = engine.vehicle_lane(scooter)?;
        let edge = current.edge;
        let lane_count = net.lane_count(edge);
        if lane_count <= 1 {
            return Ok(None);
        }

        let mut observations: Vec<LaneObservation> = Vec::with_capacity(lane_count as usize);
        for index in 0..lane_count {
            let lane = LaneRef::new(edge, index);
            let Some(spec) = net.lane(lane) else { continue };
            let kind = classify(spec.allowed);

            if kind == LaneKind::Dedicated {
                engine.change_lane(scooter, index, self.lane_change_secs)?;
                return Ok(Some(LaneChange {
                    scooter,
                    lane,
                    kind,
                    measurement: engine.lane_measurement(lane),
                }));
            }

            let measurement = match kind {
                // Prohibited lanes never win; pin them to full occupancy.
                LaneKind::Prohibited => LaneMeasurement { occupancy: 1.0, ..Default::default() },
                LaneKind::Sidewalk => {
                    let mut m = engine.lane_measurement(lane);
                    // Sidewalk crowding is pedestrians per metre, not the
                    // vehicular occupancy ratio.
                    let length = net.edge_length_m(edge).max(1.0);
                    m.occupancy = engine.persons_on_edge(edge).len() as f32 / length;
                    m
                }
                _ => engine.lane_measurement(lane),
            };
            observations.push(LaneObservation { index, kind, measurement });
        }

        let Some(winner) = preferred_lane(&observations, &self.thresholds) else {
            return Ok(None);
        };
        engine.change_lane(scooter, winner, self.lane_change_secs)?;
        let chosen = observations
            .iter()
            .find(|o| o.index == winner)
            .expect("winner came from observations");
        Ok(Some(LaneChange {
            scooter,
            lane: LaneRef::new(edge, winner),
            kind: chosen.kind,
            measurement: chosen.measurement,
        }))
    }
}
