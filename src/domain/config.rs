// ============================================================================
// Batching Configuration
// Tunable parameters for feasibility, savings and scan order
// ============================================================================

use rust_decimal::Decimal;

use super::{BatchingError, BatchingResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default strict upper bound on pair distance (grid units)
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 4.0;

/// Default handling overhead of a paired route (minutes)
pub const DEFAULT_FIXED_OVERHEAD_MINUTES: f64 = 5.0;

/// Default multiplier on distance when estimating joint route time
pub const DEFAULT_ROUTE_FACTOR: f64 = 2.0;

// ============================================================================
// Scan Order
// ============================================================================

/// Sequence in which the greedy pass visits orders.
///
/// The pass is not globally optimal, so this choice decides tie-breaks and
/// the final partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScanOrder {
    /// Input sequence order
    #[default]
    AsGiven,

    /// Smallest remaining budget first; equal budgets keep input order.
    /// Malformed budgets go last.
    MostUrgentFirst,
}

// ============================================================================
// Matching Strategy
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchingStrategyType {
    /// Nearest feasible partner, earliest scan position on ties
    #[default]
    GreedyNearest,

    /// First feasible partner in scan order, ignoring distance.
    /// Baseline for comparing against `GreedyNearest`.
    FirstFeasible,
}

// ============================================================================
// Complete Batching Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatchingConfig {
    /// Pairs at or beyond this distance are never batched
    pub distance_threshold: f64,

    /// Fixed minutes added to every paired route
    pub fixed_overhead_minutes: f64,

    /// Joint time = route_factor * distance + fixed_overhead_minutes
    pub route_factor: f64,

    /// Saving credited to each paired batch (one rider not sent)
    pub rider_cost: Decimal,

    pub scan_order: ScanOrder,

    pub strategy: MatchingStrategyType,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            fixed_overhead_minutes: DEFAULT_FIXED_OVERHEAD_MINUTES,
            route_factor: DEFAULT_ROUTE_FACTOR,
            rider_cost: Decimal::ONE,
            scan_order: ScanOrder::AsGiven,
            strategy: MatchingStrategyType::GreedyNearest,
        }
    }
}

impl BatchingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    pub fn with_fixed_overhead(mut self, minutes: f64) -> Self {
        self.fixed_overhead_minutes = minutes;
        self
    }

    pub fn with_route_factor(mut self, factor: f64) -> Self {
        self.route_factor = factor;
        self
    }

    pub fn with_rider_cost(mut self, cost: Decimal) -> Self {
        self.rider_cost = cost;
        self
    }

    pub fn with_scan_order(mut self, scan_order: ScanOrder) -> Self {
        self.scan_order = scan_order;
        self
    }

    pub fn with_strategy(mut self, strategy: MatchingStrategyType) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> BatchingResult<()> {
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(invalid("distance threshold must be finite and positive"));
        }

        if !self.fixed_overhead_minutes.is_finite() || self.fixed_overhead_minutes < 0.0 {
            return Err(invalid("fixed overhead must be finite and non-negative"));
        }

        if !self.route_factor.is_finite() || self.route_factor <= 0.0 {
            return Err(invalid("route factor must be finite and positive"));
        }

        if self.rider_cost < Decimal::ZERO {
            return Err(invalid("rider cost cannot be negative"));
        }

        Ok(())
    }
}

fn invalid(reason: &str) -> BatchingError {
    BatchingError::InvalidConfig(reason.to_string())
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl BatchingConfig {
    /// Dark-store hub: default geometry, savings in the local currency
    /// (e.g. 40 per rider not sent).
    pub fn dark_store(rider_cost: Decimal) -> Self {
        Self::default().with_rider_cost(rider_cost)
    }

    /// Default geometry, most urgent orders get first pick of partners
    pub fn urgent_first() -> Self {
        Self::default().with_scan_order(ScanOrder::MostUrgentFirst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BatchingConfig::default();

        assert_eq!(config.distance_threshold, 4.0);
        assert_eq!(config.fixed_overhead_minutes, 5.0);
        assert_eq!(config.route_factor, 2.0);
        assert_eq!(config.rider_cost, Decimal::ONE);
        assert_eq!(config.scan_order, ScanOrder::AsGiven);
        assert_eq!(config.strategy, MatchingStrategyType::GreedyNearest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = BatchingConfig::new()
            .with_distance_threshold(6.0)
            .with_fixed_overhead(3.0)
            .with_route_factor(1.5)
            .with_rider_cost(Decimal::from(40))
            .with_strategy(MatchingStrategyType::FirstFeasible);

        assert_eq!(config.distance_threshold, 6.0);
        assert_eq!(config.fixed_overhead_minutes, 3.0);
        assert_eq!(config.route_factor, 1.5);
        assert_eq!(config.rider_cost, Decimal::from(40));
        assert_eq!(config.strategy, MatchingStrategyType::FirstFeasible);
    }

    #[test]
    fn test_validation() {
        assert!(BatchingConfig::new()
            .with_distance_threshold(0.0)
            .validate()
            .is_err());
        assert!(BatchingConfig::new()
            .with_distance_threshold(f64::NAN)
            .validate()
            .is_err());
        assert!(BatchingConfig::new()
            .with_fixed_overhead(-1.0)
            .validate()
            .is_err());
        assert!(BatchingConfig::new()
            .with_route_factor(f64::INFINITY)
            .validate()
            .is_err());

        let err = BatchingConfig::new()
            .with_rider_cost(Decimal::from(-1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, BatchingError::InvalidConfig(_)));

        // zero overhead is allowed
        assert!(BatchingConfig::new().with_fixed_overhead(0.0).validate().is_ok());
    }

    #[test]
    fn test_preset_configs() {
        let store = BatchingConfig::dark_store(Decimal::from(40));
        assert_eq!(store.rider_cost, Decimal::from(40));
        assert_eq!(store.distance_threshold, DEFAULT_DISTANCE_THRESHOLD);

        let urgent = BatchingConfig::urgent_first();
        assert_eq!(urgent.scan_order, ScanOrder::MostUrgentFirst);
    }
}
