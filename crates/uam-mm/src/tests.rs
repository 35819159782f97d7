//! Tests for lane rating, selection, and proximity scanning.

use std::sync::Arc;

use uam_core::{ClassSet, EdgeId, LaneRef, Point, ScooterConfig, VehicleClass, VehicleId};
use uam_engine::{LaneMeasurement, SyntheticEngine, TrafficEngine};
use uam_net::{EdgeKind, Lane, NetworkBuilder, NetworkModel};

use crate::rating::{LaneKind, LaneObservation, RatingThresholds, classify, preferred_lane, rate};
use crate::selector::LaneSelector;
use crate::proximity::close_encounters;

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn thresholds() -> RatingThresholds {
    RatingThresholds::from(&ScooterConfig::default())
}

fn standard_lane() -> Lane {
    Lane::new(ClassSet::of(&[VehicleClass::Passenger, VehicleClass::Scooter]), 3.2)
}

fn sidewalk_lane() -> Lane {
    Lane::new(ClassSet::of(&[VehicleClass::Pedestrian, VehicleClass::Scooter]), 2.0)
}

fn dedicated_lane() -> Lane {
    Lane::new(ClassSet::of(&[VehicleClass::Bicycle, VehicleClass::Scooter]), 1.5)
}

fn cars_only_lane() -> Lane {
    Lane::new(ClassSet::of(&[VehicleClass::Passenger]), 3.2)
}

/// One 500 m edge with the given lanes, plus a scooter standing on it.
fn edge_with_scooter(lanes: Vec<Lane>) -> (Arc<NetworkModel>, SyntheticEngine, EdgeId, VehicleId) {
    let mut b = NetworkBuilder::new();
    let j0 = b.add_junction(Point::new(0.0, 0.0));
    let j1 = b.add_junction(Point::new(500.0, 0.0));
    let edge = b.add_edge(j0, j1, 13.9, EdgeKind::Street, lanes);
    let net = Arc::new(b.build());
    let mut eng = SyntheticEngine::new(Arc::clone(&net), 1);
    let scooter = eng.add_vehicle(VehicleClass::Scooter, vec![edge]).unwrap();
    (net, eng, edge, scooter)
}

// ── Classification ────────────────────────────────────────────────────────────

#[cfg(test)]
mod classification {
    use super::*;

    #[test]
    fn scooterless_lane_is_prohibited() {
        assert_eq!(classify(cars_only_lane().allowed), LaneKind::Prohibited);
        assert_eq!(classify(ClassSet::EMPTY), LaneKind::Prohibited);
    }

    #[test]
    fn bicycle_lane_is_dedicated() {
        assert_eq!(classify(dedicated_lane().allowed), LaneKind::Dedicated);
    }

    #[test]
    fn footway_is_sidewalk() {
        assert_eq!(classify(sidewalk_lane().allowed), LaneKind::Sidewalk);
    }

    #[test]
    fn mixed_traffic_is_standard() {
        assert_eq!(classify(standard_lane().allowed), LaneKind::Standard);
        // Pedestrians + cars still count as a road lane, not a sidewalk.
        let shared = ClassSet::of(&[
            VehicleClass::Passenger,
            VehicleClass::Pedestrian,
            VehicleClass::Scooter,
        ]);
        assert_eq!(classify(shared), LaneKind::Standard);
    }
}

// ── Rating table ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod rating_table {
    use super::*;

    #[test]
    fn sidewalk_rows() {
        let th = thresholds();
        assert_eq!(rate(LaneKind::Sidewalk, 0.01, 0.0, 0.0, &th), 1.0);
        assert_eq!(rate(LaneKind::Sidewalk, 0.2, 0.0, 0.0, &th), 0.6);
    }

    #[test]
    fn standard_rows() {
        let th = thresholds();
        // Quiet road.
        assert_eq!(rate(LaneKind::Standard, 0.0, 30.0, 20.0, &th), 0.9);
        // Busy road, 2×2 over speed and vehicle size.
        assert_eq!(rate(LaneKind::Standard, 0.2, 5.0, 5.0, &th), 0.8);
        assert_eq!(rate(LaneKind::Standard, 0.2, 5.0, 12.0, &th), 0.7);
        assert_eq!(rate(LaneKind::Standard, 0.2, 20.0, 5.0, &th), 0.5);
        assert_eq!(rate(LaneKind::Standard, 0.2, 20.0, 12.0, &th), 0.4);
    }

    #[test]
    fn prohibited_scores_minus_one_regardless() {
        let th = thresholds();
        for occ in [0.0, 0.5, 1.0] {
            for speed in [0.0, 50.0] {
                assert_eq!(rate(LaneKind::Prohibited, occ, speed, 3.0, &th), -1.0);
            }
        }
    }

    #[test]
    fn scores_stay_within_unit_band() {
        let th = thresholds();
        for kind in [LaneKind::Prohibited, LaneKind::Dedicated, LaneKind::Sidewalk, LaneKind::Standard] {
            for occ in [0.0, 0.02, 0.04, 0.1, 0.6, 1.0] {
                for speed in [0.0, 9.9, 10.1, 40.0] {
                    for len in [0.0, 6.9, 7.1, 18.0] {
                        let score = rate(kind, occ, speed, len, &th);
                        assert!((-1.0..=1.0).contains(&score), "{kind} {occ} {speed} {len} → {score}");
                    }
                }
            }
        }
    }

    #[test]
    fn preferred_lane_requires_positive_score() {
        let th = thresholds();
        let prohibited = LaneObservation {
            index:       0,
            kind:        LaneKind::Prohibited,
            measurement: LaneMeasurement { occupancy: 1.0, ..Default::default() },
        };
        assert_eq!(preferred_lane(&[prohibited], &th), None);
        assert_eq!(preferred_lane(&[], &th), None);
    }

    #[test]
    fn ties_keep_the_first_seen_lane() {
        let th = thresholds();
        let quiet = LaneMeasurement::default();
        let a = LaneObservation { index: 0, kind: LaneKind::Sidewalk, measurement: quiet };
        let b = LaneObservation { index: 1, kind: LaneKind::Sidewalk, measurement: quiet };
        assert_eq!(preferred_lane(&[a, b], &th), Some(0));
    }
}

// ── Selector ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod selector {
    use super::*;

    fn selector() -> LaneSelector {
        LaneSelector::new(&ScooterConfig::default())
    }

    #[test]
    fn single_lane_edge_is_left_alone() {
        let (net, mut eng, _edge, scooter) = edge_with_scooter(vec![standard_lane()]);
        let change = selector().select_for(&net, &mut eng, scooter).unwrap();
        assert!(change.is_none());
    }

    #[test]
    fn dedicated_lane_chosen_unconditionally() {
        // The empty sidewalk would score a perfect 1.0, but the dedicated
        // lane wins without the table being consulted.
        let (net, mut eng, edge, scooter) =
            edge_with_scooter(vec![standard_lane(), sidewalk_lane(), dedicated_lane()]);
        let change = selector().select_for(&net, &mut eng, scooter).unwrap().unwrap();
        assert_eq!(change.kind, LaneKind::Dedicated);
        assert_eq!(change.lane, LaneRef::new(edge, 2));
        assert_eq!(eng.vehicle_lane(scooter).unwrap().index, 2);
    }

    #[test]
    fn quiet_sidewalk_beats_busy_road() {
        let (net, mut eng, edge, scooter) =
            edge_with_scooter(vec![standard_lane(), sidewalk_lane()]);
        eng.set_lane_measurement(
            LaneRef::new(edge, 0),
            LaneMeasurement { occupancy: 0.3, mean_speed: 8.0, mean_vehicle_length: 5.0 },
        );
        let change = selector().select_for(&net, &mut eng, scooter).unwrap().unwrap();
        assert_eq!(change.kind, LaneKind::Sidewalk);
        assert_eq!(change.lane.index, 1);
    }

    #[test]
    fn crowded_sidewalk_loses_to_quiet_road() {
        let (net, mut eng, edge, scooter) =
            edge_with_scooter(vec![standard_lane(), sidewalk_lane()]);
        // 60 pedestrians on a 500 m edge → 0.12 peds/m, over the 0.033 limit.
        for _ in 0..60 {
            eng.add_person(edge, vec![]).unwrap();
        }
        eng.set_lane_measurement(
            LaneRef::new(edge, 0),
            LaneMeasurement { occupancy: 0.01, mean_speed: 8.0, mean_vehicle_length: 5.0 },
        );
        let change = selector().select_for(&net, &mut eng, scooter).unwrap().unwrap();
        assert_eq!(change.kind, LaneKind::Standard);
        assert_eq!(change.lane.index, 0);
        assert!((change.measurement.occupancy - 0.01).abs() < 1e-6);
    }

    #[test]
    fn no_candidate_issues_no_change() {
        let (net, mut eng, _edge, scooter) =
            edge_with_scooter(vec![cars_only_lane(), cars_only_lane()]);
        let change = selector().select_for(&net, &mut eng, scooter).unwrap();
        assert!(change.is_none());
        assert_eq!(eng.vehicle_lane(scooter).unwrap().index, 0);
    }
}

// ── Proximity ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod proximity {
    use super::*;

    #[test]
    fn pedestrian_on_same_lane_within_threshold() {
        let (_net, mut eng, edge, scooter) =
            edge_with_scooter(vec![standard_lane(), sidewalk_lane()]);
        let ped = eng.add_person(edge, vec![]).unwrap();
        // Move the scooter onto the sidewalk lane, where the pedestrian is.
        eng.change_lane(scooter, 1, 100).unwrap();

        let hits = close_encounters(&eng, scooter, 2.0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].person, ped);
        assert!(hits[0].distance_m <= 2.0);
        assert_eq!(hits[0].lane, LaneRef::new(edge, 1));
    }

    #[test]
    fn different_lane_does_not_count() {
        let (_net, mut eng, edge, scooter) =
            edge_with_scooter(vec![standard_lane(), sidewalk_lane()]);
        eng.add_person(edge, vec![]).unwrap();
        // Scooter stays on the road lane; the pedestrian reports the sidewalk.
        let hits = close_encounters(&eng, scooter, 2.0).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn vanished_scooter_is_an_error() {
        let (_net, mut eng, _edge, scooter) =
            edge_with_scooter(vec![standard_lane(), sidewalk_lane()]);
        eng.remove_vehicle(scooter).unwrap();
        assert!(close_encounters(&eng, scooter, 2.0).is_err());
    }
}
