//! Unit tests for uam-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, LaneRef, PersonId, VehicleId};

    #[test]
    fn index_and_validity() {
        let id = VehicleId(42);
        assert_eq!(id.index(), 42);
        assert!(id.is_valid());
        assert!(!VehicleId::INVALID.is_valid());
    }

    #[test]
    fn ordering() {
        assert!(PersonId(0) < PersonId(1));
        assert!(EdgeId(100) > EdgeId(99));
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(VehicleId::default(), VehicleId::INVALID);
    }

    #[test]
    fn lane_ref_display() {
        let lane = LaneRef::new(EdgeId(3), 1);
        assert_eq!(lane.to_string(), "edge3_1");
    }
}

#[cfg(test)]
mod geo {
    use crate::Point;

    #[test]
    fn pythagoras() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn rounding_to_metres() {
        assert_eq!(Point::new(12.4, -3.6).rounded(), (12, -4));
    }

    #[test]
    fn midpoint() {
        let m = Point::new(0.0, 0.0).midpoint(Point::new(10.0, 20.0));
        assert_eq!(m, Point::new(5.0, 10.0));
    }
}

#[cfg(test)]
mod time {
    use crate::{Step, StepClock};

    #[test]
    fn step_arithmetic() {
        let s = Step(10);
        assert_eq!(s + 5, Step(15));
        assert_eq!(s.offset(3), Step(13));
        assert_eq!(Step(15) - Step(10), 5u64);
    }

    #[test]
    fn periodicity() {
        assert!(Step(0).is_multiple_of(10));
        assert!(Step(20).is_multiple_of(10));
        assert!(!Step(21).is_multiple_of(10));
        assert!(!Step(5).is_multiple_of(0));
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = StepClock::new(15);
        assert_eq!(clock.elapsed_secs(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 30);
        assert_eq!(clock.steps_for_secs(31), 3); // rounds up
    }
}

#[cfg(test)]
mod class {
    use crate::{ClassSet, VehicleClass};

    #[test]
    fn set_membership() {
        let set = ClassSet::of(&[VehicleClass::Bicycle, VehicleClass::Scooter]);
        assert!(set.contains(VehicleClass::Scooter));
        assert!(!set.contains(VehicleClass::Passenger));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn with_and_without() {
        let set = ClassSet::EMPTY.with(VehicleClass::Taxi);
        assert!(set.contains(VehicleClass::Taxi));
        assert!(set.without(VehicleClass::Taxi).is_empty());
    }

    #[test]
    fn all_contains_everything() {
        for c in VehicleClass::ALL {
            assert!(ClassSet::ALL.contains(c), "{c} missing from ALL");
        }
    }

    #[test]
    fn display_joins_labels() {
        let set = ClassSet::of(&[VehicleClass::Pedestrian, VehicleClass::Bicycle]);
        assert_eq!(set.to_string(), "bicycle|pedestrian");
        assert_eq!(ClassSet::EMPTY.to_string(), "none");
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.sample().to_bits(), b.sample().to_bits());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SimRng::new(1);
        let mut b = SimRng::new(2);
        let same = (0..32).filter(|_| a.sample() == b.sample()).count();
        assert!(same < 32);
    }

    #[test]
    fn child_is_independent() {
        let mut root = SimRng::new(9);
        let mut child = root.child(1);
        // Drawing from the child must not change the parent's stream
        // relative to a parent that never had a child used.
        let mut reference = SimRng::new(9);
        let _ = reference.child(1);
        let _ = child.sample();
        assert_eq!(root.sample().to_bits(), reference.sample().to_bits());
    }
}

#[cfg(test)]
mod config {
    use crate::{ClassSet, ControlConfig};

    #[test]
    fn default_is_valid() {
        assert!(ControlConfig::default().validate().is_ok());
    }

    #[test]
    fn densities_bounded() {
        let mut cfg = ControlConfig::default();
        cfg.uam.density = 1.2;
        assert!(cfg.validate().is_err());

        let mut cfg = ControlConfig::default();
        cfg.uam.density = 0.7;
        cfg.scooter.density = 0.6;
        assert!(cfg.validate().is_err(), "densities summing past 1.0 must be rejected");
    }

    #[test]
    fn zero_step_rejected() {
        let mut cfg = ControlConfig::default();
        cfg.step_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn lane_period_must_divide() {
        let mut cfg = ControlConfig::default();
        cfg.step_secs = 3;
        cfg.scooter.lane_find_period_secs = 10;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_eligible_rejected() {
        let mut cfg = ControlConfig::default();
        cfg.conversion.eligible = ClassSet::EMPTY;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn lane_period_steps() {
        let mut cfg = ControlConfig::default();
        cfg.step_secs = 5;
        cfg.scooter.lane_find_period_secs = 10;
        assert_eq!(cfg.lane_find_period_steps(), 2);
    }
}
