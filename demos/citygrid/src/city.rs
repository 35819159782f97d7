//! Synthetic demo city: a street grid with two UAM hubs.
//!
//! ```text
//!   hubA──┐                                   ┌──hubB
//!         │   ·   ·   ·   (4×4 street grid)   │
//!         └─ NW corner          SE corner ────┘
//! ```
//!
//! Streets are two-way with a mixed-traffic lane and a sidewalk; the hub
//! aprons and the inter-hub corridor belong to the UAM-only sub-network.

use std::sync::Arc;

use uam_core::{ClassSet, EdgeId, JunctionId, Point, VehicleClass};
use uam_net::{EdgeKind, Lane, NetworkBuilder, NetworkModel};

/// Junctions per grid side.
const GRID: usize = 4;
/// Street block length, metres.
const BLOCK_M: f32 = 400.0;
/// Urban speed limit, m/s (50 km/h).
const STREET_MPS: f32 = 13.9;
/// Corridor speed, m/s (200 km/h).
const CORRIDOR_MPS: f32 = 55.6;

pub struct CityGrid {
    pub net: Arc<NetworkModel>,
    /// Forward street edges — demand endpoints are drawn from these.
    pub streets: Vec<EdgeId>,
}

fn ground_lanes() -> Vec<Lane> {
    vec![
        Lane::new(
            ClassSet::of(&[
                VehicleClass::Passenger,
                VehicleClass::Bus,
                VehicleClass::Bicycle,
                VehicleClass::Scooter,
            ]),
            3.2,
        ),
        Lane::new(ClassSet::of(&[VehicleClass::Pedestrian, VehicleClass::Scooter]), 2.0),
    ]
}

fn apron_lanes() -> Vec<Lane> {
    vec![
        Lane::new(ClassSet::of(&[VehicleClass::Taxi]), 9.5),
        Lane::new(ClassSet::of(&[VehicleClass::Pedestrian]), 2.0),
    ]
}

pub fn build_city() -> CityGrid {
    let mut b = NetworkBuilder::new();

    // Street grid.
    let mut junctions: [[Option<JunctionId>; GRID]; GRID] = [[None; GRID]; GRID];
    for (row, row_junctions) in junctions.iter_mut().enumerate() {
        for (col, junction) in row_junctions.iter_mut().enumerate() {
            *junction = Some(b.add_junction(Point::new(
                col as f32 * BLOCK_M,
                row as f32 * BLOCK_M,
            )));
        }
    }
    let at = |row: usize, col: usize| junctions[row][col].expect("grid junction");

    let mut streets = Vec::new();
    for row in 0..GRID {
        for col in 0..GRID {
            if col + 1 < GRID {
                let (f, _) =
                    b.add_two_way(at(row, col), at(row, col + 1), STREET_MPS, EdgeKind::Street, ground_lanes());
                streets.push(f);
            }
            if row + 1 < GRID {
                let (f, _) =
                    b.add_two_way(at(row, col), at(row + 1, col), STREET_MPS, EdgeKind::Street, ground_lanes());
                streets.push(f);
            }
        }
    }

    // Hub A beside the north-west corner.
    let ja0 = b.add_junction(Point::new(-250.0, 0.0));
    let ja1 = b.add_junction(Point::new(-170.0, 0.0));
    b.add_two_way(at(0, 0), ja0, STREET_MPS, EdgeKind::Street, ground_lanes());
    let (_, apron_a_rev) = b.add_two_way(ja0, ja1, CORRIDOR_MPS, EdgeKind::UamCorridor, apron_lanes());
    b.add_parking(apron_a_rev, 10, true);

    // Hub B beside the south-east corner.
    let south_east = at(GRID - 1, GRID - 1);
    let far = (GRID - 1) as f32 * BLOCK_M;
    let jb0 = b.add_junction(Point::new(far + 170.0, far));
    let jb1 = b.add_junction(Point::new(far + 250.0, far));
    let (_, apron_b_rev) = b.add_two_way(jb0, jb1, CORRIDOR_MPS, EdgeKind::UamCorridor, apron_lanes());
    b.add_two_way(jb1, south_east, STREET_MPS, EdgeKind::Street, ground_lanes());
    b.add_parking(apron_b_rev, 10, true);

    // Inter-hub corridor.
    b.add_two_way(ja1, jb0, CORRIDOR_MPS, EdgeKind::UamCorridor, vec![Lane::new(
        ClassSet::of(&[VehicleClass::Taxi]),
        9.5,
    )]);

    CityGrid { net: Arc::new(b.build()), streets }
}
