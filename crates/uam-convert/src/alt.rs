//! Alternative-edge search for endpoints that reject the target mode.

use uam_core::{ConversionConfig, EdgeId, VehicleClass};
use uam_net::NetworkModel;

/// Find the nearest edge around `edge` that admits `class`.
///
/// Searches rings of radius `alt_radius_m × k` for `k = 1 ..= retries + 1`,
/// centred on the edge's reference point, and returns the closest hit.
/// Edges of the UAM-only sub-network never qualify — a ground-mode endpoint
/// relocated onto a hub apron would make the trip unservable.
///
/// Returns `None` once the final ring comes up empty.
pub fn find_alternative_edge(
    net:   &NetworkModel,
    edge:  EdgeId,
    class: VehicleClass,
    cfg:   &ConversionConfig,
) -> Option<EdgeId> {
    let center = net.edge_origin(edge);
    for k in 1..=cfg.alt_retries + 1 {
        let radius = cfg.alt_radius_m * k as f32;
        for (_, candidate) in net.edges_within(center, radius) {
            if candidate == edge || net.is_uam_only(candidate) {
                continue;
            }
            if net.allows(candidate, class) {
                return Some(candidate);
            }
        }
    }
    None
}
