//! The mode-conversion selector.

use uam_core::{ConversionConfig, EdgeId, PersonId, Point, SimRng, VehicleClass, VehicleId};
use uam_engine::{Rgba, TrafficEngine};
use uam_net::NetworkModel;

use crate::alt::find_alternative_edge;

// ── Outcome types ─────────────────────────────────────────────────────────────

/// Which alternative mode a conversion pass targets.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ConversionMode {
    Uam,
    Scooter,
}

impl ConversionMode {
    /// The class the trip endpoints must admit for the converted agent to
    /// start and finish there.
    fn access_class(self) -> VehicleClass {
        match self {
            ConversionMode::Uam     => VehicleClass::Pedestrian,
            ConversionMode::Scooter => VehicleClass::Scooter,
        }
    }
}

/// Why a drawn conversion was abandoned (original vehicle left untouched).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AbandonReason {
    /// The engine found no usable route or plan between the endpoints.
    NoRoute,
    /// An endpoint rejected the mode and the radius search found no
    /// substitute edge.
    NoAlternative,
}

/// The replacement agent a successful conversion created.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Converted {
    Customer {
        person: PersonId,
        /// `true` when the plan degenerated to a single walking leg (the
        /// taxi offered no benefit over walking).
        walk_only: bool,
    },
    Scooter {
        vehicle: VehicleId,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Outcome {
    Converted(Converted),
    Abandoned(AbandonReason),
}

/// Everything the caller needs to track and log one conversion attempt that
/// passed the Bernoulli trial.
#[derive(Clone, Debug)]
pub struct ConversionReport {
    pub original:       VehicleId,
    pub original_class: VehicleClass,
    /// From-junction position of the (possibly relocated) origin edge.
    pub origin: Point,
    /// From-junction position of the (possibly relocated) destination edge.
    pub dest: Point,
    pub outcome: Outcome,
}

// ── Trial primitive ───────────────────────────────────────────────────────────

/// One Bernoulli trial against the configured density.
///
/// Exactly one uniform sample is consumed per call, so the draw sequence —
/// and with it the whole run — reproduces from the seed alone.
#[inline]
pub fn conversion_trial(rng: &mut SimRng, probability: f64) -> bool {
    rng.sample() <= probability
}

// ── ModeConverter ─────────────────────────────────────────────────────────────

/// Converts freshly spawned trips into UAM or scooter journeys.
pub struct ModeConverter {
    cfg: ConversionConfig,
}

impl ModeConverter {
    pub fn new(cfg: &ConversionConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Run one conversion pass over `candidates` (the vehicles that entered
    /// the simulation this step, in ascending id order for reproducible
    /// draws).
    ///
    /// Returns a report per candidate that passed the trial — converted or
    /// abandoned.  Candidates that fail the trial, are of an ineligible
    /// class, or vanish mid-query produce no report.
    pub fn run_step<E: TrafficEngine>(
        &self,
        net:         &NetworkModel,
        engine:      &mut E,
        candidates:  &[VehicleId],
        mode:        ConversionMode,
        probability: f64,
        rng:         &mut SimRng,
    ) -> Vec<ConversionReport> {
        let mut reports = Vec::new();
        for &vehicle in candidates {
            let Ok(class) = engine.vehicle_class(vehicle) else {
                continue;
            };
            if !self.cfg.eligible.contains(class) {
                continue;
            }
            if !conversion_trial(rng, probability) {
                continue;
            }
            if let Some(report) = self.convert_one(net, engine, vehicle, class, mode) {
                reports.push(report);
            }
        }
        reports
    }

    /// Attempt one conversion after a won trial.
    fn convert_one<E: TrafficEngine>(
        &self,
        net:     &NetworkModel,
        engine:  &mut E,
        vehicle: VehicleId,
        class:   VehicleClass,
        mode:    ConversionMode,
    ) -> Option<ConversionReport> {
        let Ok(route) = engine.vehicle_route(vehicle) else {
            return None;
        };
        let (&first, &last) = (route.first()?, route.last()?);

        let report = |origin, dest, outcome| ConversionReport {
            original: vehicle,
            original_class: class,
            origin,
            dest,
            outcome,
        };

        // Relocate endpoints that reject the target mode.
        let access = mode.access_class();
        let origin_edge = match self.resolve_endpoint(net, first, access) {
            Some(e) => e,
            None => {
                return Some(report(
                    net.edge_origin(first),
                    net.edge_origin(last),
                    Outcome::Abandoned(AbandonReason::NoAlternative),
                ));
            }
        };
        let dest_edge = match self.resolve_endpoint(net, last, access) {
            Some(e) => e,
            None => {
                return Some(report(
                    net.edge_origin(origin_edge),
                    net.edge_origin(last),
                    Outcome::Abandoned(AbandonReason::NoAlternative),
                ));
            }
        };

        let origin = net.edge_origin(origin_edge);
        let dest   = net.edge_origin(dest_edge);

        match mode {
            ConversionMode::Uam => {
                let Ok(plan) = engine.intermodal_plan(origin_edge, dest_edge) else {
                    return None;
                };
                if plan.is_empty() {
                    return Some(report(origin, dest, Outcome::Abandoned(AbandonReason::NoRoute)));
                }
                let walk_only = plan.len() == 1;
                let Ok(person) = engine.add_person(origin_edge, plan) else {
                    return None;
                };
                // The original may already have left the simulation; the
                // replacement stands either way.
                let _ = engine.remove_vehicle(vehicle);
                engine.set_person_color(person, if walk_only { Rgba::ORANGE } else { Rgba::RED });
                Some(report(origin, dest, Outcome::Converted(Converted::Customer { person, walk_only })))
            }
            ConversionMode::Scooter => {
                let Ok(ride) = engine.direct_route(origin_edge, dest_edge, VehicleClass::Scooter)
                else {
                    return None;
                };
                if ride.is_empty() {
                    return Some(report(origin, dest, Outcome::Abandoned(AbandonReason::NoRoute)));
                }
                let Ok(scooter) = engine.add_vehicle(VehicleClass::Scooter, ride) else {
                    return None;
                };
                let _ = engine.remove_vehicle(vehicle);
                Some(report(origin, dest, Outcome::Converted(Converted::Scooter { vehicle: scooter })))
            }
        }
    }

    fn resolve_endpoint(
        &self,
        net:   &NetworkModel,
        edge:  EdgeId,
        class: VehicleClass,
    ) -> Option<EdgeId> {
        if net.allows(edge, class) && !net.is_uam_only(edge) {
            return Some(edge);
        }
        find_alternative_edge(net, edge, class, &self.cfg)
    }
}
