//! Network topology model and builder.
//!
//! # Data layout
//!
//! Edge attributes live in parallel `Vec`s indexed by `EdgeId` in insertion
//! order — insertion order is stable so `EdgeId`s handed out by the builder
//! remain valid in the built model.  Outgoing-edge adjacency uses a CSR
//! index: for a junction `j`, the outgoing `EdgeId`s occupy
//!
//! ```text
//! out_edge_ids[ out_start[j] .. out_start[j+1] ]
//! ```
//!
//! # Direction pairing
//!
//! A two-way road is two directed edges explicitly paired via
//! [`NetworkModel::opposite`].  This replaces sign-prefix id conventions:
//! the pad serving a hub edge is found by `opposite(edge)` + parking lookup,
//! never by string manipulation.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over edge reference points (the from-junction
//! position) answers "which edges lie within radius r of p" — the primitive
//! behind the alternative-edge search.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use uam_core::{ClassSet, EdgeId, JunctionId, LaneRef, ParkingId, Point};

// ── Lane & edge attribute types ───────────────────────────────────────────────

/// One lane of a directed edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lane {
    /// Vehicle classes allowed to use the lane.
    pub allowed: ClassSet,
    /// Lane width in metres.
    pub width_m: f32,
}

impl Lane {
    pub fn new(allowed: ClassSet, width_m: f32) -> Self {
        Self { allowed, width_m }
    }
}

/// What kind of infrastructure an edge represents.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeKind {
    /// Ordinary ground-level street.
    #[default]
    Street,
    /// Part of the UAM-only sub-network (hub aprons and inter-hub corridors).
    /// Excluded from alternative-edge searches for ground modes.
    UamCorridor,
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the spatial index: an edge's reference point plus its id.
#[derive(Clone)]
struct EdgeEntry {
    point: [f32; 2],
    id: EdgeId,
}

impl RTreeObject for EdgeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for EdgeEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NetworkModel ──────────────────────────────────────────────────────────────

/// Immutable network topology shared by the control components and, in tests
/// and demos, by the synthetic engine.
///
/// Do not construct directly; use [`NetworkBuilder`].
pub struct NetworkModel {
    // ── Junction data ─────────────────────────────────────────────────────
    junction_pos: Vec<Point>,

    // ── Edge data (indexed by EdgeId, insertion order) ────────────────────
    edge_from:     Vec<JunctionId>,
    edge_to:       Vec<JunctionId>,
    edge_length_m: Vec<f32>,
    edge_speed:    Vec<f32>, // speed limit, m/s
    edge_kind:     Vec<EdgeKind>,
    edge_lanes:    Vec<Vec<Lane>>,
    /// Opposite-direction twin; `EdgeId::INVALID` for one-way edges.
    edge_opposite: Vec<EdgeId>,
    edge_parkings: Vec<Vec<ParkingId>>,

    // ── CSR adjacency (junction → outgoing EdgeIds) ───────────────────────
    out_start:    Vec<u32>,
    out_edge_ids: Vec<EdgeId>,

    // ── Parking registry (indexed by ParkingId) ───────────────────────────
    parking_edge:     Vec<EdgeId>,
    parking_capacity: Vec<u32>,
    parking_uam:      Vec<bool>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<EdgeEntry>,
}

impl NetworkModel {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn junction_count(&self) -> usize {
        self.junction_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_from.len()
    }

    pub fn parking_count(&self) -> usize {
        self.parking_edge.len()
    }

    // ── Junction accessors ────────────────────────────────────────────────

    #[inline]
    pub fn junction_pos(&self, j: JunctionId) -> Point {
        self.junction_pos[j.index()]
    }

    /// Iterator over the `EdgeId`s of all outgoing edges of `junction`.
    #[inline]
    pub fn out_edges(&self, junction: JunctionId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.out_start[junction.index()] as usize;
        let end   = self.out_start[junction.index() + 1] as usize;
        self.out_edge_ids[start..end].iter().copied()
    }

    // ── Edge accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn edge_from(&self, e: EdgeId) -> JunctionId {
        self.edge_from[e.index()]
    }

    #[inline]
    pub fn edge_to(&self, e: EdgeId) -> JunctionId {
        self.edge_to[e.index()]
    }

    #[inline]
    pub fn edge_length_m(&self, e: EdgeId) -> f32 {
        self.edge_length_m[e.index()]
    }

    /// Speed limit in m/s.
    #[inline]
    pub fn edge_speed(&self, e: EdgeId) -> f32 {
        self.edge_speed[e.index()]
    }

    #[inline]
    pub fn edge_kind(&self, e: EdgeId) -> EdgeKind {
        self.edge_kind[e.index()]
    }

    /// `true` for edges of the UAM-only sub-network.
    #[inline]
    pub fn is_uam_only(&self, e: EdgeId) -> bool {
        self.edge_kind[e.index()] == EdgeKind::UamCorridor
    }

    /// Reference point of an edge — its from-junction position.
    #[inline]
    pub fn edge_origin(&self, e: EdgeId) -> Point {
        self.junction_pos[self.edge_from[e.index()].index()]
    }

    /// Position of an edge's downstream junction.
    #[inline]
    pub fn edge_end(&self, e: EdgeId) -> Point {
        self.junction_pos[self.edge_to[e.index()].index()]
    }

    /// The opposite-direction twin, if the edge belongs to a two-way pair.
    #[inline]
    pub fn opposite(&self, e: EdgeId) -> Option<EdgeId> {
        let twin = self.edge_opposite[e.index()];
        twin.is_valid().then_some(twin)
    }

    // ── Lane accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn lanes(&self, e: EdgeId) -> &[Lane] {
        &self.edge_lanes[e.index()]
    }

    #[inline]
    pub fn lane_count(&self, e: EdgeId) -> u8 {
        self.edge_lanes[e.index()].len() as u8
    }

    pub fn lane(&self, lane: LaneRef) -> Option<&Lane> {
        self.edge_lanes.get(lane.edge.index())?.get(lane.index as usize)
    }

    /// `true` if at least one lane of `e` admits `class`.
    pub fn allows(&self, e: EdgeId, class: uam_core::VehicleClass) -> bool {
        self.edge_lanes[e.index()].iter().any(|l| l.allowed.contains(class))
    }

    // ── Parking registry ──────────────────────────────────────────────────

    #[inline]
    pub fn parking_edge(&self, p: ParkingId) -> EdgeId {
        self.parking_edge[p.index()]
    }

    #[inline]
    pub fn parking_capacity(&self, p: ParkingId) -> u32 {
        self.parking_capacity[p.index()]
    }

    /// `true` if the facility is a UAM hub pad.
    #[inline]
    pub fn is_uam_hub(&self, p: ParkingId) -> bool {
        self.parking_uam[p.index()]
    }

    /// Facilities located on `e`.
    #[inline]
    pub fn parkings_on(&self, e: EdgeId) -> &[ParkingId] {
        &self.edge_parkings[e.index()]
    }

    /// All UAM hub pads, in `ParkingId` order.
    pub fn uam_parkings(&self) -> impl Iterator<Item = ParkingId> + '_ {
        (0..self.parking_count() as u32)
            .map(ParkingId)
            .filter(|&p| self.parking_uam[p.index()])
    }

    /// Number of UAM hub pads in the network.
    pub fn uam_hub_count(&self) -> usize {
        self.parking_uam.iter().filter(|&&u| u).count()
    }

    /// Edges where UAM customers board: hub-apron edges whose twin hosts a
    /// UAM pad.
    pub fn uam_boarding_edges(&self) -> Vec<EdgeId> {
        (0..self.edge_count() as u32)
            .map(EdgeId)
            .filter(|&e| {
                self.opposite(e)
                    .is_some_and(|twin| self.parkings_on(twin).iter().any(|&p| self.is_uam_hub(p)))
            })
            .collect()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// All edges whose reference point lies within `radius_m` of `pos`,
    /// sorted by ascending distance.
    pub fn edges_within(&self, pos: Point, radius_m: f32) -> Vec<(f32, EdgeId)> {
        let mut hits: Vec<(f32, EdgeId)> = self
            .spatial_idx
            .locate_within_distance([pos.x, pos.y], radius_m * radius_m)
            .map(|entry| {
                let d2 = entry.distance_2(&[pos.x, pos.y]);
                (d2.sqrt(), entry.id)
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`NetworkModel`] incrementally, then call [`build`](Self::build).
///
/// Edge lengths are computed from the junction positions; `EdgeId`s are
/// assigned in insertion order and stay valid after `build()`.
///
/// # Example
///
/// ```
/// use uam_core::{ClassSet, Point};
/// use uam_net::{EdgeKind, Lane, NetworkBuilder};
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_junction(Point::new(0.0, 0.0));
/// let c = b.add_junction(Point::new(500.0, 0.0));
/// let lane = Lane::new(ClassSet::ALL, 3.2);
/// let (fwd, _rev) = b.add_two_way(a, c, 13.9, EdgeKind::Street, vec![lane]);
/// let net = b.build();
/// assert_eq!(net.edge_count(), 2);
/// assert!((net.edge_length_m(fwd) - 500.0).abs() < 0.01);
/// ```
pub struct NetworkBuilder {
    junctions: Vec<Point>,
    edges:     Vec<RawEdge>,
    parkings:  Vec<RawParking>,
}

struct RawEdge {
    from:     JunctionId,
    to:       JunctionId,
    speed:    f32,
    kind:     EdgeKind,
    lanes:    Vec<Lane>,
    opposite: EdgeId,
}

struct RawParking {
    edge:     EdgeId,
    capacity: u32,
    uam:      bool,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self { junctions: Vec::new(), edges: Vec::new(), parkings: Vec::new() }
    }

    /// Add a junction and return its `JunctionId` (sequential from 0).
    pub fn add_junction(&mut self, pos: Point) -> JunctionId {
        let id = JunctionId(self.junctions.len() as u32);
        self.junctions.push(pos);
        id
    }

    /// Add a **directed** edge; `speed` is the limit in m/s.
    pub fn add_edge(
        &mut self,
        from:  JunctionId,
        to:    JunctionId,
        speed: f32,
        kind:  EdgeKind,
        lanes: Vec<Lane>,
    ) -> EdgeId {
        debug_assert!(!lanes.is_empty(), "an edge needs at least one lane");
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(RawEdge { from, to, speed, kind, lanes, opposite: EdgeId::INVALID });
        id
    }

    /// Add both directions of a two-way road and pair them.
    pub fn add_two_way(
        &mut self,
        a:     JunctionId,
        b:     JunctionId,
        speed: f32,
        kind:  EdgeKind,
        lanes: Vec<Lane>,
    ) -> (EdgeId, EdgeId) {
        let fwd = self.add_edge(a, b, speed, kind, lanes.clone());
        let rev = self.add_edge(b, a, speed, kind, lanes);
        self.pair_opposite(fwd, rev);
        (fwd, rev)
    }

    /// Record that `a` and `b` are opposite directions of the same road.
    pub fn pair_opposite(&mut self, a: EdgeId, b: EdgeId) {
        self.edges[a.index()].opposite = b;
        self.edges[b.index()].opposite = a;
    }

    /// Register a parking facility on `edge`.
    pub fn add_parking(&mut self, edge: EdgeId, capacity: u32, uam: bool) -> ParkingId {
        let id = ParkingId(self.parkings.len() as u32);
        self.parkings.push(RawParking { edge, capacity, uam });
        id
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Consume the builder and produce a [`NetworkModel`].
    ///
    /// Time complexity: O(E log E) for the adjacency sort + O(E log E) for
    /// the R-tree bulk load.
    pub fn build(self) -> NetworkModel {
        let junction_count = self.junctions.len();
        let edge_count     = self.edges.len();

        // Edge attribute columns, in stable insertion order.
        let edge_from:     Vec<JunctionId> = self.edges.iter().map(|e| e.from).collect();
        let edge_to:       Vec<JunctionId> = self.edges.iter().map(|e| e.to).collect();
        let edge_speed:    Vec<f32>        = self.edges.iter().map(|e| e.speed).collect();
        let edge_kind:     Vec<EdgeKind>   = self.edges.iter().map(|e| e.kind).collect();
        let edge_opposite: Vec<EdgeId>     = self.edges.iter().map(|e| e.opposite).collect();
        let edge_length_m: Vec<f32> = self
            .edges
            .iter()
            .map(|e| self.junctions[e.from.index()].distance(self.junctions[e.to.index()]))
            .collect();
        let edge_lanes: Vec<Vec<Lane>> = self.edges.into_iter().map(|e| e.lanes).collect();

        // CSR adjacency over stable EdgeIds: counting sort by from-junction.
        let mut out_start = vec![0u32; junction_count + 1];
        for from in &edge_from {
            out_start[from.index() + 1] += 1;
        }
        for i in 1..=junction_count {
            out_start[i] += out_start[i - 1];
        }
        let mut cursor = out_start.clone();
        let mut out_edge_ids = vec![EdgeId::INVALID; edge_count];
        for (i, from) in edge_from.iter().enumerate() {
            let slot = cursor[from.index()] as usize;
            out_edge_ids[slot] = EdgeId(i as u32);
            cursor[from.index()] += 1;
        }
        debug_assert_eq!(out_start[junction_count] as usize, edge_count);

        // Parking columns + per-edge facility lists.
        let parking_edge:     Vec<EdgeId> = self.parkings.iter().map(|p| p.edge).collect();
        let parking_capacity: Vec<u32>    = self.parkings.iter().map(|p| p.capacity).collect();
        let parking_uam:      Vec<bool>   = self.parkings.iter().map(|p| p.uam).collect();
        let mut edge_parkings = vec![Vec::new(); edge_count];
        for (i, p) in parking_edge.iter().enumerate() {
            edge_parkings[p.index()].push(ParkingId(i as u32));
        }

        // Bulk-load the R-tree over edge reference points.
        let entries: Vec<EdgeEntry> = edge_from
            .iter()
            .enumerate()
            .map(|(i, from)| {
                let pos = self.junctions[from.index()];
                EdgeEntry { point: [pos.x, pos.y], id: EdgeId(i as u32) }
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        NetworkModel {
            junction_pos: self.junctions,
            edge_from,
            edge_to,
            edge_length_m,
            edge_speed,
            edge_kind,
            edge_lanes,
            edge_opposite,
            edge_parkings,
            out_start,
            out_edge_ids,
            parking_edge,
            parking_capacity,
            parking_uam,
            spatial_idx,
        }
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
