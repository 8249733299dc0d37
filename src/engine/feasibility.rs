// ============================================================================
// Pair Feasibility
// Joint distance/time test two orders must pass to share a rider
// ============================================================================

use crate::domain::{BatchingConfig, Location};

/// Feasibility predicate built from the batching configuration
///
/// ```text
/// distance   = |ax - bx| + |ay - by|
/// joint_time = route_factor * distance + fixed_overhead
/// feasible   = distance < threshold
///              && joint_time < a.budget
///              && joint_time < b.budget
/// ```
///
/// All comparisons are strict: a pair sitting exactly on the threshold, or
/// whose joint time exactly equals a budget, is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeasibilityPredicate {
    distance_threshold: f64,
    fixed_overhead_minutes: f64,
    route_factor: f64,
}

impl FeasibilityPredicate {
    pub fn new(distance_threshold: f64, fixed_overhead_minutes: f64, route_factor: f64) -> Self {
        Self {
            distance_threshold,
            fixed_overhead_minutes,
            route_factor,
        }
    }

    pub fn from_config(config: &BatchingConfig) -> Self {
        Self::new(
            config.distance_threshold,
            config.fixed_overhead_minutes,
            config.route_factor,
        )
    }

    pub fn distance(&self, a: &Location, b: &Location) -> f64 {
        a.manhattan_distance(b)
    }

    /// Minutes one rider needs to serve both stops
    pub fn joint_time(&self, distance: f64) -> f64 {
        self.route_factor * distance + self.fixed_overhead_minutes
    }

    pub fn within_range(&self, distance: f64) -> bool {
        distance < self.distance_threshold
    }

    pub fn is_feasible(&self, a: &Location, a_budget: f64, b: &Location, b_budget: f64) -> bool {
        self.evaluate(a, a_budget, b, b_budget).is_some()
    }

    /// Distance of a feasible pair, `None` when the pair must not share a rider
    pub fn evaluate(&self, a: &Location, a_budget: f64, b: &Location, b_budget: f64) -> Option<f64> {
        let distance = self.distance(a, b);
        if !self.within_range(distance) {
            return None;
        }

        let joint_time = self.joint_time(distance);
        (joint_time < a_budget && joint_time < b_budget).then_some(distance)
    }
}

impl Default for FeasibilityPredicate {
    fn default() -> Self {
        Self::from_config(&BatchingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn loc(x: f64, y: f64) -> Location {
        Location::new(x, y)
    }

    #[test]
    fn test_close_pair_with_slack_is_feasible() {
        let p = FeasibilityPredicate::default();
        // distance 2, joint time 9
        assert_eq!(p.joint_time(2.0), 9.0);
        assert!(p.is_feasible(&loc(0.0, 0.0), 20.0, &loc(1.0, 1.0), 20.0));
    }

    #[test]
    fn test_far_pair_is_infeasible_regardless_of_slack() {
        let p = FeasibilityPredicate::default();
        assert!(!p.is_feasible(&loc(0.0, 0.0), 1000.0, &loc(9.0, 9.0), 1000.0));
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        let p = FeasibilityPredicate::default();
        // exactly 4 apart
        assert!(!p.is_feasible(&loc(0.0, 0.0), 100.0, &loc(2.0, 2.0), 100.0));
        assert!(!p.is_feasible(&loc(0.0, 0.0), 100.0, &loc(4.0, 0.0), 100.0));
        // one unit below
        assert!(p.is_feasible(&loc(0.0, 0.0), 100.0, &loc(3.0, 0.0), 100.0));
    }

    #[test]
    fn test_deadline_blocks_pairing() {
        let p = FeasibilityPredicate::default();
        // distance 1, joint time 7
        assert!(p.is_feasible(&loc(0.0, 0.0), 8.0, &loc(1.0, 0.0), 20.0));
        assert!(!p.is_feasible(&loc(0.0, 0.0), 6.0, &loc(1.0, 0.0), 20.0));
        // equal to joint time is still late
        assert!(!p.is_feasible(&loc(0.0, 0.0), 7.0, &loc(1.0, 0.0), 20.0));
        // either side can block
        assert!(!p.is_feasible(&loc(0.0, 0.0), 20.0, &loc(1.0, 0.0), 6.0));
    }

    #[test]
    fn test_evaluate_returns_distance() {
        let p = FeasibilityPredicate::default();
        assert_eq!(
            p.evaluate(&loc(0.0, 0.0), 20.0, &loc(1.0, 2.0), 20.0),
            Some(3.0)
        );
        assert_eq!(p.evaluate(&loc(0.0, 0.0), 5.0, &loc(1.0, 2.0), 20.0), None);
    }

    #[test]
    fn test_custom_geometry() {
        let p = FeasibilityPredicate::new(10.0, 0.0, 1.0);
        assert!(p.is_feasible(&loc(0.0, 0.0), 9.5, &loc(9.0, 0.0), 9.5));
        assert!(!p.is_feasible(&loc(0.0, 0.0), 9.0, &loc(9.0, 0.0), 9.5));
    }

    quickcheck! {
        fn prop_feasibility_is_symmetric(
            ax: i16, ay: i16, a_budget: u16,
            bx: i16, by: i16, b_budget: u16
        ) -> bool {
            let p = FeasibilityPredicate::default();
            let a = loc(f64::from(ax % 8), f64::from(ay % 8));
            let b = loc(f64::from(bx % 8), f64::from(by % 8));
            let (ab, bb) = (f64::from(a_budget % 40), f64::from(b_budget % 40));
            p.is_feasible(&a, ab, &b, bb) == p.is_feasible(&b, bb, &a, ab)
        }
    }
}
