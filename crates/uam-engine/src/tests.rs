//! Tests for the synthetic engine against the trait contract.

use std::sync::Arc;

use uam_core::{ClassSet, EdgeId, LaneRef, ParkingId, Point, VehicleClass};
use uam_net::{EdgeKind, Lane, NetworkBuilder, NetworkModel};

use crate::{LaneMeasurement, LegMode, SyntheticEngine, TaxiState, TrafficEngine};

// ── Test city ─────────────────────────────────────────────────────────────────

/// Ids of interest in the two-hub test city.
struct City {
    net:        Arc<NetworkModel>,
    /// Street j0→j1, …, j3→j4 (west to east).
    streets:    [EdgeId; 4],
    /// Ground access roads: j0→hubA and hubB→j4.
    access_a:   EdgeId,
    access_b:   EdgeId,
    /// Hub apron boarding edges (twin hosts the pad).
    board_a:    EdgeId,
    board_b:    EdgeId,
    pad_a:      ParkingId,
    pad_b:      ParkingId,
}

fn ground_lanes() -> Vec<Lane> {
    vec![
        Lane::new(
            ClassSet::of(&[VehicleClass::Passenger, VehicleClass::Bicycle, VehicleClass::Scooter]),
            3.2,
        ),
        // Sidewalk.
        Lane::new(ClassSet::of(&[VehicleClass::Pedestrian, VehicleClass::Scooter]), 2.0),
    ]
}

fn apron_lanes() -> Vec<Lane> {
    vec![
        Lane::new(ClassSet::of(&[VehicleClass::Taxi]), 9.5),
        Lane::new(ClassSet::of(&[VehicleClass::Pedestrian]), 2.0),
    ]
}

fn corridor_lanes() -> Vec<Lane> {
    vec![Lane::new(ClassSet::of(&[VehicleClass::Taxi]), 9.5)]
}

/// A 2.5 km street line with a UAM hub near each end.
///
/// ```text
///   hubA: jA0──jA1 ····corridor···· jB0──jB1 :hubB
///          │                                │
///   j0────j1────j2────j3────j4──────────────┘
/// ```
fn hub_city() -> City {
    let mut b = NetworkBuilder::new();

    // Street line, 500 m spacing.
    let js: Vec<_> = (0..5)
        .map(|i| b.add_junction(Point::new(i as f32 * 500.0, 0.0)))
        .collect();
    let mut streets = [EdgeId::INVALID; 4];
    for i in 0..4 {
        let (f, _) = b.add_two_way(js[i], js[i + 1], 13.9, EdgeKind::Street, ground_lanes());
        streets[i] = f;
    }

    // Hub A above j0.
    let ja0 = b.add_junction(Point::new(0.0, 200.0));
    let ja1 = b.add_junction(Point::new(80.0, 200.0));
    let (access_a, _) = b.add_two_way(js[0], ja0, 13.9, EdgeKind::Street, ground_lanes());
    let (board_a, apron_a_rev) = b.add_two_way(ja0, ja1, 55.6, EdgeKind::UamCorridor, apron_lanes());
    let pad_a = b.add_parking(apron_a_rev, 10, true);

    // Hub B above j4.
    let jb0 = b.add_junction(Point::new(1920.0, 200.0));
    let jb1 = b.add_junction(Point::new(2000.0, 200.0));
    let (board_b, apron_b_rev) = b.add_two_way(jb0, jb1, 55.6, EdgeKind::UamCorridor, apron_lanes());
    let (access_b, _) = b.add_two_way(jb1, js[4], 13.9, EdgeKind::Street, ground_lanes());
    let pad_b = b.add_parking(apron_b_rev, 10, true);

    // Inter-hub corridor, taxi only.
    b.add_two_way(ja1, jb0, 55.6, EdgeKind::UamCorridor, corridor_lanes());

    City {
        net: Arc::new(b.build()),
        streets,
        access_a,
        access_b,
        board_a,
        board_b,
        pad_a,
        pad_b,
    }
}

fn engine(city: &City) -> SyntheticEngine {
    SyntheticEngine::new(Arc::clone(&city.net), 1)
}

// ── Trips & live sets ─────────────────────────────────────────────────────────

#[cfg(test)]
mod trips {
    use super::*;

    #[test]
    fn scheduled_trip_spawns_moves_and_terminates() {
        let city = hub_city();
        let mut eng = engine(&city);
        eng.schedule_trip(1, VehicleClass::Passenger, city.streets[0], city.streets[3]);

        assert!(eng.vehicle_ids().is_empty());
        eng.advance().unwrap();
        let ids = eng.vehicle_ids();
        assert_eq!(ids.len(), 1);
        let v = ids[0];
        assert_eq!(eng.vehicle_class(v).unwrap(), VehicleClass::Passenger);

        // Route has 4 edges; the vehicle disappears after traversing them.
        let route = eng.vehicle_route(v).unwrap();
        assert_eq!(route.len(), 4);
        for _ in 0..route.len() {
            eng.advance().unwrap();
        }
        assert!(eng.vehicle_ids().is_empty(), "trip vehicle should have terminated");
        assert!(eng.vehicle_position(v).is_err());
    }

    #[test]
    fn unroutable_demand_is_skipped() {
        let city = hub_city();
        let mut eng = engine(&city);
        // A passenger car cannot reach the taxi-only apron.
        eng.schedule_trip(1, VehicleClass::Passenger, city.streets[0], city.board_b);
        eng.advance().unwrap();
        assert!(eng.vehicle_ids().is_empty());
    }

    #[test]
    fn add_and_remove_vehicle() {
        let city = hub_city();
        let mut eng = engine(&city);
        let v = eng
            .add_vehicle(VehicleClass::Scooter, vec![city.streets[0], city.streets[1]])
            .unwrap();
        assert_eq!(eng.vehicle_ids(), vec![v]);
        eng.remove_vehicle(v).unwrap();
        assert!(eng.remove_vehicle(v).is_err());
    }

    #[test]
    fn change_lane_validates_index() {
        let city = hub_city();
        let mut eng = engine(&city);
        let v = eng
            .add_vehicle(VehicleClass::Scooter, vec![city.streets[0], city.streets[1]])
            .unwrap();
        eng.change_lane(v, 1, 100).unwrap();
        assert_eq!(eng.vehicle_lane(v).unwrap().index, 1);
        assert!(eng.change_lane(v, 7, 100).is_err());
    }

    #[test]
    fn closed_engine_refuses_to_advance() {
        let city = hub_city();
        let mut eng = engine(&city);
        eng.close();
        assert!(eng.advance().is_err());
    }
}

// ── Routing services ──────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use super::*;

    #[test]
    fn direct_route_empty_when_unreachable() {
        let city = hub_city();
        let eng = engine(&city);
        // Scooters are not admitted on the corridor.
        let r = eng
            .direct_route(city.streets[0], city.board_b, VehicleClass::Scooter)
            .unwrap();
        assert!(r.is_empty());
        let ok = eng
            .direct_route(city.streets[0], city.streets[3], VehicleClass::Scooter)
            .unwrap();
        assert!(!ok.is_empty());
    }

    #[test]
    fn long_trip_gets_three_leg_taxi_plan() {
        let city = hub_city();
        let eng = engine(&city);
        let plan = eng.intermodal_plan(city.access_a, city.access_b).unwrap();
        assert_eq!(plan.len(), 3, "expected walk+taxi+walk: {plan:?}");
        assert_eq!(plan[0].mode, LegMode::Walk);
        assert_eq!(plan[1].mode, LegMode::Taxi);
        assert_eq!(plan[1].from, city.board_a);
        assert_eq!(plan[1].to, city.board_b);
        assert_eq!(plan[2].mode, LegMode::Walk);
    }

    #[test]
    fn short_trip_walks() {
        let city = hub_city();
        let eng = engine(&city);
        // Adjacent street edges: the hub detour can never pay off.
        let plan = eng.intermodal_plan(city.streets[1], city.streets[2]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].mode, LegMode::Walk);
    }
}

// ── Taxi fleet & reservations ─────────────────────────────────────────────────

#[cfg(test)]
mod fleet {
    use super::*;

    #[test]
    fn seeded_taxis_are_idle_and_parked() {
        let city = hub_city();
        let mut eng = engine(&city);
        let t0 = eng.add_parked_taxi(city.pad_a).unwrap();
        let t1 = eng.add_parked_taxi(city.pad_a).unwrap();
        let t2 = eng.add_parked_taxi(city.pad_b).unwrap();

        assert_eq!(eng.taxi_fleet(TaxiState::Idle), vec![t0, t1, t2]);
        assert!(eng.taxi_fleet(TaxiState::EnRoute).is_empty());
        assert_eq!(eng.parking_occupants(city.pad_a), vec![t0, t1]);
        assert_eq!(eng.parking_occupants(city.pad_b), vec![t2]);
    }

    #[test]
    fn walk_taxi_walk_plan_issues_reservation_and_flies() {
        let city = hub_city();
        let mut eng = engine(&city);
        eng.set_pickup_secs(1);
        let taxi = eng.add_parked_taxi(city.pad_a).unwrap();

        let plan = eng.intermodal_plan(city.access_a, city.access_b).unwrap();
        assert_eq!(plan.len(), 3);
        let ped = eng.add_person(city.access_a, plan).unwrap();

        // Walk to the hub until the reservation appears.
        let mut reservation = None;
        for _ in 0..20 {
            eng.advance().unwrap();
            let mut fresh = eng.drain_reservations();
            if let Some(r) = fresh.pop() {
                reservation = Some(r);
                break;
            }
        }
        let reservation = reservation.expect("reservation should have been issued");
        assert_eq!(reservation.persons, vec![ped]);
        assert_eq!(reservation.from, city.board_a);
        assert_eq!(reservation.to, city.board_b);

        eng.dispatch_taxi(taxi, &[reservation.id]).unwrap();
        assert_eq!(eng.taxi_fleet(TaxiState::EnRoute), vec![taxi]);

        // Boarding, then flight.
        let mut boarded = false;
        for _ in 0..200 {
            eng.advance().unwrap();
            if eng.person_vehicle(ped).unwrap() == Some(taxi) {
                boarded = true;
                assert_eq!(eng.taxi_fleet(TaxiState::Occupied), vec![taxi]);
                assert_eq!(eng.vehicle_passengers(taxi).unwrap(), vec![ped]);
                break;
            }
        }
        assert!(boarded, "passenger never boarded");

        // Landing: taxi parks at the destination pad, customer walks on and
        // eventually leaves the simulation.
        let mut landed = false;
        for _ in 0..400 {
            eng.advance().unwrap();
            if !eng.person_ids().contains(&ped) {
                landed = true;
                break;
            }
        }
        assert!(landed, "customer never finished the trip");
        assert_eq!(eng.parking_occupants(city.pad_b), vec![taxi]);
        assert_eq!(eng.taxi_fleet(TaxiState::Idle), vec![taxi]);
    }

    #[test]
    fn dispatching_a_busy_taxi_fails() {
        let city = hub_city();
        let mut eng = engine(&city);
        eng.set_pickup_secs(1);
        let taxi = eng.add_parked_taxi(city.pad_a).unwrap();

        let plan = eng.intermodal_plan(city.access_a, city.access_b).unwrap();
        eng.add_person(city.access_a, plan).unwrap();
        let reservation = loop {
            eng.advance().unwrap();
            if let Some(r) = eng.drain_reservations().pop() {
                break r;
            }
        };
        eng.dispatch_taxi(taxi, &[reservation.id]).unwrap();
        // Second dispatch against the same (now en-route) taxi must fail.
        assert!(eng.dispatch_taxi(taxi, &[reservation.id]).is_err());
    }
}

// ── Lane measurements & pedestrians ──────────────────────────────────────────

#[cfg(test)]
mod lanes {
    use super::*;

    #[test]
    fn override_takes_precedence() {
        let city = hub_city();
        let mut eng = engine(&city);
        let lane = LaneRef::new(city.streets[0], 0);
        let m = LaneMeasurement { occupancy: 0.42, mean_speed: 3.0, mean_vehicle_length: 6.5 };
        eng.set_lane_measurement(lane, m);
        assert_eq!(eng.lane_measurement(lane), m);
    }

    #[test]
    fn computed_occupancy_counts_lane_vehicles() {
        let city = hub_city();
        let mut eng = engine(&city);
        let empty = eng.lane_measurement(LaneRef::new(city.streets[0], 0));
        assert_eq!(empty.occupancy, 0.0);

        eng.add_vehicle(VehicleClass::Passenger, vec![city.streets[0], city.streets[1]])
            .unwrap();
        let m = eng.lane_measurement(LaneRef::new(city.streets[0], 0));
        assert!(m.occupancy > 0.0 && m.occupancy <= 1.0);
        assert!(m.mean_vehicle_length > 0.0);
    }

    #[test]
    fn persons_report_sidewalk_lane() {
        let city = hub_city();
        let mut eng = engine(&city);
        let plan = eng.intermodal_plan(city.streets[1], city.streets[2]).unwrap();
        let ped = eng.add_person(city.streets[1], plan).unwrap();
        let lane = eng.person_lane(ped).unwrap();
        assert_eq!(lane.edge, city.streets[1]);
        assert_eq!(lane.index, 1, "pedestrians keep to the sidewalk lane");
        assert_eq!(eng.persons_on_edge(city.streets[1]), vec![ped]);
    }

    #[test]
    fn sim_secs_tracks_step_length() {
        let city = hub_city();
        let mut eng = SyntheticEngine::new(Arc::clone(&city.net), 5);
        eng.advance().unwrap();
        eng.advance().unwrap();
        assert_eq!(eng.sim_secs(), 10.0);
    }
}
