//! Lane classification and the comfort rating table.

use uam_core::{ClassSet, ScooterConfig, VehicleClass};
use uam_engine::LaneMeasurement;

/// Score below which a lane is never selected.  Every positive-scoring lane
/// beats it; prohibited lanes sit far under it.
pub const NO_CANDIDATE_SCORE: f32 = 0.0;

// ── LaneKind ──────────────────────────────────────────────────────────────────

/// How a lane presents itself to a scooter.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum LaneKind {
    /// Scooters are not admitted at all.
    Prohibited,
    /// Bicycle/scooter-only lane — taken unconditionally when present.
    Dedicated,
    /// Footway: pedestrians but no motor traffic.
    Sidewalk,
    /// Ordinary mixed-traffic lane.
    Standard,
}

impl LaneKind {
    /// Label used in lane-event log rows.
    pub fn as_str(self) -> &'static str {
        match self {
            LaneKind::Prohibited => "prohibited",
            LaneKind::Dedicated  => "dedicated",
            LaneKind::Sidewalk   => "sidewalk",
            LaneKind::Standard   => "standard",
        }
    }
}

impl std::fmt::Display for LaneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a lane from its allowed-class set, from a scooter's viewpoint.
pub fn classify(allowed: ClassSet) -> LaneKind {
    use VehicleClass::{Bicycle, Passenger, Pedestrian, Scooter};

    if !allowed.contains(Scooter) {
        return LaneKind::Prohibited;
    }
    if allowed.contains(Bicycle) && !allowed.contains(Passenger) && !allowed.contains(Pedestrian) {
        return LaneKind::Dedicated;
    }
    if allowed.contains(Pedestrian) && !allowed.contains(Passenger) && !allowed.contains(Bicycle) {
        return LaneKind::Sidewalk;
    }
    LaneKind::Standard
}

// ── Thresholds ────────────────────────────────────────────────────────────────

/// The four comfort thresholds, extracted from [`ScooterConfig`].
#[derive(Copy, Clone, Debug)]
pub struct RatingThresholds {
    /// Pedestrians per metre above which a sidewalk counts as crowded.
    pub sidewalk_occupancy: f32,
    /// Occupancy ratio above which a road lane counts as busy.
    pub road_occupancy: f32,
    /// Mean speed (m/s) above which road traffic counts as fast.
    pub road_speed: f32,
    /// Mean vehicle length (m) above which road traffic counts as heavy.
    pub road_length: f32,
}

impl From<&ScooterConfig> for RatingThresholds {
    fn from(cfg: &ScooterConfig) -> Self {
        Self {
            sidewalk_occupancy: cfg.sidewalk_occupancy_threshold,
            road_occupancy:     cfg.road_occupancy_threshold,
            road_speed:         cfg.road_speed_threshold,
            road_length:        cfg.road_length_threshold,
        }
    }
}

// ── Rating ────────────────────────────────────────────────────────────────────

/// Comfort score for one lane, in `[-1.0, 1.0]`.
///
/// | kind      | condition                             | score |
/// |-----------|---------------------------------------|-------|
/// | sidewalk  | quiet                                 |  1.0  |
/// | sidewalk  | crowded                               |  0.6  |
/// | standard  | low occupancy                         |  0.9  |
/// | standard  | busy, slow, small vehicles            |  0.8  |
/// | standard  | busy, slow, large vehicles            |  0.7  |
/// | standard  | busy, fast, small vehicles            |  0.5  |
/// | standard  | busy, fast, large vehicles            |  0.4  |
/// | other     | —                                     | -1.0  |
pub fn rate(
    kind:        LaneKind,
    occupancy:   f32,
    mean_speed:  f32,
    mean_length: f32,
    th:          &RatingThresholds,
) -> f32 {
    match kind {
        LaneKind::Sidewalk => {
            if occupancy <= th.sidewalk_occupancy {
                1.0
            } else {
                0.6
            }
        }
        LaneKind::Standard => {
            if occupancy <= th.road_occupancy {
                return 0.9;
            }
            if mean_speed <= th.road_speed {
                if mean_length <= th.road_length { 0.8 } else { 0.7 }
            } else {
                if mean_length <= th.road_length { 0.5 } else { 0.4 }
            }
        }
        // Dedicated lanes bypass the table; a dedicated lane reaching this
        // function is treated like any other non-candidate.
        LaneKind::Prohibited | LaneKind::Dedicated => -1.0,
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// One rated candidate lane, transient for a single selection decision.
#[derive(Clone, Debug)]
pub struct LaneObservation {
    pub index:       u8,
    pub kind:        LaneKind,
    pub measurement: LaneMeasurement,
}

impl LaneObservation {
    fn score(&self, th: &RatingThresholds) -> f32 {
        rate(
            self.kind,
            self.measurement.occupancy,
            self.measurement.mean_speed,
            self.measurement.mean_vehicle_length,
            th,
        )
    }
}

/// The highest-scoring candidate above [`NO_CANDIDATE_SCORE`], or `None` if
/// no lane qualifies.  Ties keep the first-seen observation, so the result
/// is stable under the caller's lane order.
pub fn preferred_lane(observations: &[LaneObservation], th: &RatingThresholds) -> Option<u8> {
    let mut best_score = NO_CANDIDATE_SCORE;
    let mut best: Option<u8> = None;
    for obs in observations {
        let score = obs.score(th);
        if score > best_score {
            best_score = score;
            best = Some(obs.index);
        }
    }
    best
}
