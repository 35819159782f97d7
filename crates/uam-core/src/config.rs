//! Immutable run configuration.
//!
//! One `ControlConfig` is constructed at startup, validated once, and passed
//! by reference into every component.  Nothing in the control layer reads
//! tunables from anywhere else — there is no global mutable configuration.

use crate::class::{ClassSet, VehicleClass};
use crate::error::{CoreError, CoreResult};

/// Top-level configuration for one control run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlConfig {
    /// Scenario label carried into every log row.
    pub scenario: String,

    /// Simulated seconds per engine step.
    pub step_secs: u32,

    /// Stop once simulated time exceeds this many seconds.
    pub horizon_secs: u64,

    /// Master RNG seed.  The same seed and demand reproduce a run exactly.
    pub seed: u64,

    /// Whether an interactive display is attached (enables fleet recoloring).
    pub display: bool,

    pub uam:        UamConfig,
    pub scooter:    ScooterConfig,
    pub conversion: ConversionConfig,
}

/// UAM taxi tunables.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UamConfig {
    /// Probability that an eligible new trip converts to a UAM customer.
    pub density: f64,

    /// Air taxis seeded at each UAM hub during setup.
    pub vehicles_per_hub: u32,

    /// Maximum passengers per air taxi; also the pool-size dispatch trigger.
    pub capacity: usize,

    /// Maximum simulated seconds a pooled party waits for co-travellers
    /// before dispatch fires on time alone.
    pub group_finding_secs: u32,
}

/// E-scooter tunables.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScooterConfig {
    /// Probability that an eligible new trip converts to a scooter trip.
    pub density: f64,

    /// How long a commanded lane change pins the scooter to its lane.
    pub lane_change_secs: u32,

    /// Re-evaluate scooter lanes every this many simulated seconds.
    pub lane_find_period_secs: u32,

    /// Sidewalk comfort limit, pedestrians per metre of lane.
    pub sidewalk_occupancy_threshold: f32,

    /// Road occupancy ratio above which a lane counts as busy.
    pub road_occupancy_threshold: f32,

    /// Mean lane speed (m/s) above which traffic counts as fast.
    pub road_speed_threshold: f32,

    /// Mean vehicle length (m) above which traffic counts as heavy.
    pub road_length_threshold: f32,

    /// Emit scooter–pedestrian proximity rows.
    pub encounter_log: bool,

    /// Distance (m) under which a scooter–pedestrian pair is logged.
    pub encounter_distance_m: f32,
}

/// Mode-conversion tunables shared by both modes.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionConfig {
    /// Original-trip classes allowed to convert.
    pub eligible: ClassSet,

    /// Base radius (m) of the alternative-edge search around an endpoint
    /// that disallows the target mode.
    pub alt_radius_m: f32,

    /// Extra radius expansions tried before the search gives up.
    /// With the default base the final ring reaches 10× the base radius.
    pub alt_retries: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            scenario:     "default".to_owned(),
            step_secs:    1,
            horizon_secs: 7_200,
            seed:         42,
            display:      false,
            uam:          UamConfig::default(),
            scooter:      ScooterConfig::default(),
            conversion:   ConversionConfig::default(),
        }
    }
}

impl Default for UamConfig {
    fn default() -> Self {
        Self {
            density:           0.2,
            vehicles_per_hub:  5,
            capacity:          4,
            group_finding_secs: 180,
        }
    }
}

impl Default for ScooterConfig {
    fn default() -> Self {
        Self {
            density:                      0.0,
            lane_change_secs:             100,
            lane_find_period_secs:        10,
            sidewalk_occupancy_threshold: 0.033, // one pedestrian every ~30 m
            road_occupancy_threshold:     0.05,
            road_speed_threshold:         10.0,
            road_length_threshold:        7.0,
            encounter_log:                false,
            encounter_distance_m:         2.0,
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            eligible:     ClassSet::of(&[VehicleClass::Passenger]),
            alt_radius_m: 300.0,
            alt_retries:  9,
        }
    }
}

impl ControlConfig {
    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// Called once at startup; any error here is fatal before the loop
    /// begins.
    pub fn validate(&self) -> CoreResult<()> {
        if self.step_secs == 0 {
            return Err(CoreError::Config("step_secs must be at least 1".into()));
        }
        if self.horizon_secs == 0 {
            return Err(CoreError::Config("horizon_secs must be positive".into()));
        }
        for (name, d) in [("uam.density", self.uam.density), ("scooter.density", self.scooter.density)] {
            if !(0.0..=1.0).contains(&d) {
                return Err(CoreError::Config(format!("{name} must lie in [0, 1], got {d}")));
            }
        }
        // Both draws apply to the same trip population; together they cannot
        // exceed certainty.
        if self.uam.density + self.scooter.density > 1.0 {
            return Err(CoreError::Config(format!(
                "uam.density + scooter.density must not exceed 1.0, got {}",
                self.uam.density + self.scooter.density
            )));
        }
        if self.uam.capacity == 0 {
            return Err(CoreError::Config("uam.capacity must be at least 1".into()));
        }
        if self.scooter.lane_find_period_secs == 0 {
            return Err(CoreError::Config("scooter.lane_find_period_secs must be positive".into()));
        }
        if self.scooter.lane_find_period_secs % self.step_secs != 0 {
            return Err(CoreError::Config(format!(
                "scooter.lane_find_period_secs ({}) must be a multiple of step_secs ({})",
                self.scooter.lane_find_period_secs, self.step_secs
            )));
        }
        if self.conversion.eligible.is_empty() {
            return Err(CoreError::Config("conversion.eligible must name at least one class".into()));
        }
        if self.conversion.alt_radius_m <= 0.0 {
            return Err(CoreError::Config("conversion.alt_radius_m must be positive".into()));
        }
        Ok(())
    }

    /// Lane re-evaluation period expressed in steps.
    #[inline]
    pub fn lane_find_period_steps(&self) -> u64 {
        (self.scooter.lane_find_period_secs / self.step_secs) as u64
    }
}
