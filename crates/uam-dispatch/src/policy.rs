//! Dispatch readiness and taxi selection.

use uam_core::{Point, UamConfig, VehicleId};
use uam_engine::{TaxiState, TrafficEngine};
use uam_net::NetworkModel;

use crate::pool::{PoolEntry, PoolKey, ReservationPool};

/// One successful dispatch, for logging and statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatched {
    pub key:        PoolKey,
    pub taxi:       VehicleId,
    pub party_size: usize,
}

/// Decides when a pooled party flies and which taxi carries it.
///
/// Stateless between steps: the fleet partitions are queried fresh from the
/// engine on every evaluation and never cached.
pub struct DispatchPolicy {
    group_finding_secs: u32,
    capacity:           usize,
}

impl DispatchPolicy {
    pub fn new(cfg: &UamConfig) -> Self {
        Self {
            group_finding_secs: cfg.group_finding_secs,
            capacity:           cfg.capacity,
        }
    }

    /// A party is ready once it has waited long enough **or** grown to
    /// vehicle capacity.  Both held values are non-decreasing, so readiness
    /// is monotone until the entry is dispatched.
    #[inline]
    pub fn is_ready(&self, entry: &PoolEntry) -> bool {
        entry.waiting_secs >= self.group_finding_secs || entry.party_size() >= self.capacity
    }

    /// Evaluate every pool entry and dispatch the ready ones.
    ///
    /// Per-entry failures (party lead already gone, no idle taxi anywhere,
    /// engine refusing the dispatch) leave that entry pooled for the next
    /// step and never affect the remaining entries.
    pub fn run<E: TrafficEngine>(
        &self,
        pool:   &mut ReservationPool,
        net:    &NetworkModel,
        engine: &mut E,
    ) -> Vec<Dispatched> {
        let ready: Vec<PoolKey> = pool
            .iter()
            .filter(|(_, entry)| self.is_ready(entry))
            .map(|(&key, _)| key)
            .collect();

        let mut dispatched = Vec::new();
        for key in ready {
            let Some(entry) = pool.get(&key) else { continue };

            // Reference point for the distance fallback: wherever the first
            // waiting party member currently stands.
            let Ok(reference) = engine.person_position(entry.members[0]) else {
                continue;
            };

            let Some(taxi) = select_taxi(net, engine, &key, reference) else {
                continue; // no idle taxi anywhere this step
            };

            if engine.dispatch_taxi(taxi, &entry.reservations).is_err() {
                continue;
            }
            let entry = pool.remove(&key).expect("entry checked above");
            dispatched.push(Dispatched { key, taxi, party_size: entry.party_size() });
        }
        dispatched
    }
}

/// Pick the taxi for one party, in priority order:
///
/// 1. an idle taxi parked at a UAM pad on the origin edge's opposite twin;
/// 2. the idle taxi nearest to `reference` across every UAM pad in the
///    network (strict `<`, first minimal candidate wins).
fn select_taxi<E: TrafficEngine>(
    net:       &NetworkModel,
    engine:    &E,
    key:       &PoolKey,
    reference: Point,
) -> Option<VehicleId> {
    // Fleet partitions are read fresh for every party: an earlier dispatch
    // in the same pass must not hand out the same taxi twice.
    let idle = engine.taxi_fleet(TaxiState::Idle);

    if let Some(twin) = net.opposite(key.from) {
        for &pad in net.parkings_on(twin) {
            if !net.is_uam_hub(pad) {
                continue;
            }
            for taxi in engine.parking_occupants(pad) {
                if idle.contains(&taxi) {
                    return Some(taxi);
                }
            }
        }
    }

    // Fall back to the globally nearest idle taxi over all UAM pads.
    let mut best: Option<(f32, VehicleId)> = None;
    for pad in net.uam_parkings() {
        for taxi in engine.parking_occupants(pad) {
            if !idle.contains(&taxi) {
                continue;
            }
            let Ok(pos) = engine.vehicle_position(taxi) else {
                continue;
            };
            let distance = reference.distance(pos);
            if best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, taxi));
            }
        }
    }
    best.map(|(_, taxi)| taxi)
}
