//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Everything that needs a path asks through the [`EdgeRouter`] trait, so a
//! contraction hierarchy or congestion-aware router can be swapped in
//! without touching the control components.  The default [`DijkstraRouter`]
//! is sufficient for the synthetic engine and the demo scenarios.
//!
//! # Edge-to-edge routing
//!
//! Queries are edge-based, matching the engine's trip model: a route runs
//! from the *start* of `from` to the *end* of `to`, and the returned edge
//! list includes both endpoints.  Internally Dijkstra runs over junctions on
//! the sub-graph of edges usable by the requested class.
//!
//! # Cost units
//!
//! Costs are milliseconds (u32) internally; [`EdgeRoute`] exposes seconds.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use uam_core::{EdgeId, JunctionId, VehicleClass};

use crate::error::{NetError, NetResult};
use crate::network::NetworkModel;

// ── EdgeRoute ─────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    /// Edges to traverse in order, including the origin and destination edge.
    pub edges: Vec<EdgeId>,
    /// Total travel time in seconds at free-flow class speed.
    pub travel_secs: f32,
}

// ── EdgeRouter trait ──────────────────────────────────────────────────────────

/// Pluggable shortest-path engine over the static topology.
pub trait EdgeRouter: Send + Sync {
    /// Route from edge `from` to edge `to` for the given class.
    fn route(
        &self,
        net:   &NetworkModel,
        from:  EdgeId,
        to:    EdgeId,
        class: VehicleClass,
    ) -> NetResult<EdgeRoute>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR adjacency, restricted to edges with at
/// least one lane admitting the class.
///
/// Per-class speed on an edge is the speed limit capped by the class cruise
/// speed:
///
/// | Class      | Cap       |
/// |------------|-----------|
/// | Pedestrian | 1.4 m/s   |
/// | Bicycle    | 4.2 m/s   |
/// | Scooter    | 5.6 m/s   |
/// | others     | none      |
pub struct DijkstraRouter;

/// Cruise-speed cap for a class, m/s.
fn speed_cap(class: VehicleClass) -> f32 {
    match class {
        VehicleClass::Pedestrian => 1.4,
        VehicleClass::Bicycle    => 4.2,
        VehicleClass::Scooter    => 5.6,
        _ => f32::INFINITY,
    }
}

/// Free-flow traversal time of one edge for a class, milliseconds.
#[inline]
fn edge_cost_ms(net: &NetworkModel, e: EdgeId, class: VehicleClass) -> u32 {
    let speed = net.edge_speed(e).min(speed_cap(class)).max(0.1);
    (net.edge_length_m(e) / speed * 1000.0) as u32
}

impl EdgeRouter for DijkstraRouter {
    fn route(
        &self,
        net:   &NetworkModel,
        from:  EdgeId,
        to:    EdgeId,
        class: VehicleClass,
    ) -> NetResult<EdgeRoute> {
        if !net.allows(from, class) {
            return Err(NetError::ClassForbidden { edge: from, class });
        }
        if !net.allows(to, class) {
            return Err(NetError::ClassForbidden { edge: to, class });
        }

        if from == to {
            let ms = edge_cost_ms(net, from, class);
            return Ok(EdgeRoute { edges: vec![from], travel_secs: ms as f32 / 1000.0 });
        }

        let source = net.edge_to(from);
        let target = net.edge_from(to);
        let endpoint_ms = edge_cost_ms(net, from, class).saturating_add(edge_cost_ms(net, to, class));

        if source == target {
            return Ok(EdgeRoute {
                edges: vec![from, to],
                travel_secs: endpoint_ms as f32 / 1000.0,
            });
        }

        let inner = dijkstra(net, source, target, class)
            .ok_or(NetError::NoRoute { from, to, class })?;

        let mut edges = Vec::with_capacity(inner.edges.len() + 2);
        edges.push(from);
        edges.extend(inner.edges);
        edges.push(to);
        Ok(EdgeRoute {
            edges,
            travel_secs: (inner.total_ms.saturating_add(endpoint_ms)) as f32 / 1000.0,
        })
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

struct InnerRoute {
    edges:    Vec<EdgeId>,
    total_ms: u32,
}

fn dijkstra(
    net:    &NetworkModel,
    source: JunctionId,
    target: JunctionId,
    class:  VehicleClass,
) -> Option<InnerRoute> {
    let n = net.junction_count();
    // dist[j] = best known cost (ms) to reach junction j.
    let mut dist      = vec![u32::MAX; n];
    // prev_edge[j] = EdgeId that reached j; INVALID for unreached junctions.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[source.index()] = 0;

    // Min-heap: Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key JunctionId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u32, JunctionId)>> = BinaryHeap::new();
    heap.push(Reverse((0, source)));

    while let Some(Reverse((cost, junction))) = heap.pop() {
        if junction == target {
            return Some(reconstruct(net, &prev_edge, target, cost));
        }

        // Skip stale heap entries.
        if cost > dist[junction.index()] {
            continue;
        }

        for edge in net.out_edges(junction) {
            if !net.allows(edge, class) {
                continue;
            }
            let neighbor = net.edge_to(edge);
            let new_cost = cost.saturating_add(edge_cost_ms(net, edge, class));

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    None
}

fn reconstruct(
    net:       &NetworkModel,
    prev_edge: &[EdgeId],
    target:    JunctionId,
    total_ms:  u32,
) -> InnerRoute {
    let mut edges = Vec::new();
    let mut cur = target;
    loop {
        let e = prev_edge[cur.index()];
        if !e.is_valid() {
            break;
        }
        edges.push(e);
        cur = net.edge_from(e);
    }
    edges.reverse();
    InnerRoute { edges, total_ms }
}
