// ============================================================================
// Batch Matcher Factory
// Creates batch matchers with proper configuration
// ============================================================================

use crate::domain::config::{BatchingConfig, MatchingStrategyType, ScanOrder};
use crate::domain::BatchingResult;
use crate::engine::{BatchMatcher, FirstFeasible, GreedyNearest};
use crate::interfaces::{BatchingAlgorithm, EventHandler};
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a batch matcher from configuration
///
/// # Example
/// ```
/// use order_batching::prelude::*;
/// use std::sync::Arc;
///
/// let config = BatchingConfig::default();
/// let matcher = create_from_config(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(matcher.algorithm_name(), "GreedyNearest");
/// ```
pub fn create_from_config(
    config: BatchingConfig,
    event_handler: Arc<dyn EventHandler>,
) -> BatchingResult<BatchMatcher> {
    config.validate()?;

    let algorithm = create_batching_algorithm(config.strategy);

    tracing::debug!(
        algorithm = algorithm.name(),
        threshold = config.distance_threshold,
        overhead = config.fixed_overhead_minutes,
        "batch matcher created"
    );

    Ok(BatchMatcher::new(config, algorithm, event_handler))
}

/// Creates the pairing algorithm named by the configuration
fn create_batching_algorithm(strategy: MatchingStrategyType) -> Box<dyn BatchingAlgorithm> {
    match strategy {
        MatchingStrategyType::GreedyNearest => Box::new(GreedyNearest::new()),
        MatchingStrategyType::FirstFeasible => Box::new(FirstFeasible::new()),
    }
}

// ============================================================================
// Builder Pattern for Advanced Configuration
// ============================================================================

/// Builder for creating batch matchers with fluent API
///
/// # Example
/// ```
/// use order_batching::prelude::*;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let matcher = BatchMatcherBuilder::new()
///     .distance_threshold(4.0)
///     .fixed_overhead(5.0)
///     .rider_cost(Decimal::from(40))
///     .greedy_nearest()
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
///
/// assert_eq!(matcher.config().rider_cost, Decimal::from(40));
/// ```
#[derive(Debug, Default)]
pub struct BatchMatcherBuilder {
    config: BatchingConfig,
}

impl BatchMatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: BatchingConfig) -> Self {
        Self { config }
    }

    // ========================================================================
    // Feasibility
    // ========================================================================

    pub fn distance_threshold(mut self, threshold: f64) -> Self {
        self.config.distance_threshold = threshold;
        self
    }

    pub fn fixed_overhead(mut self, minutes: f64) -> Self {
        self.config.fixed_overhead_minutes = minutes;
        self
    }

    pub fn route_factor(mut self, factor: f64) -> Self {
        self.config.route_factor = factor;
        self
    }

    pub fn rider_cost(mut self, cost: Decimal) -> Self {
        self.config.rider_cost = cost;
        self
    }

    // ========================================================================
    // Scan order and strategy
    // ========================================================================

    pub fn scan_as_given(mut self) -> Self {
        self.config.scan_order = ScanOrder::AsGiven;
        self
    }

    pub fn scan_most_urgent_first(mut self) -> Self {
        self.config.scan_order = ScanOrder::MostUrgentFirst;
        self
    }

    pub fn greedy_nearest(mut self) -> Self {
        self.config.strategy = MatchingStrategyType::GreedyNearest;
        self
    }

    pub fn first_feasible(mut self) -> Self {
        self.config.strategy = MatchingStrategyType::FirstFeasible;
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> BatchingResult<BatchMatcher> {
        create_from_config(self.config, event_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &BatchingConfig {
        &self.config
    }
}
