// ============================================================================
// Engine Module
// Contains the core batching business logic
// ============================================================================

mod batch_matcher;
mod feasibility;
mod first_feasible;
mod greedy_nearest;

pub mod factory;

pub use batch_matcher::BatchMatcher;
pub use factory::{create_from_config, BatchMatcherBuilder};
pub use feasibility::FeasibilityPredicate;
pub use first_feasible::FirstFeasible;
pub use greedy_nearest::GreedyNearest;
