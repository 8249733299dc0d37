// ============================================================================
// Batching Algorithm Interface
// Defines the contract for pluggable pairing strategies
// ============================================================================

use crate::domain::Location;
use crate::engine::FeasibilityPredicate;

/// An order as seen by a pairing strategy. Its index in the candidate slice
/// is its scan position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub location: Location,
    pub remaining_budget: f64,
    /// False for orders with malformed fields; those are never paired
    pub eligible: bool,
}

/// Indices into the candidate slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Single(usize),
    /// Scanning candidate first, chosen partner second
    Pair(usize, usize),
}

/// Strategy pattern interface for pairing algorithms
/// Implementations: GreedyNearest, FirstFeasible
pub trait BatchingAlgorithm: Send + Sync {
    /// Partition the candidates into singles and feasible pairs
    ///
    /// # Arguments
    /// * `candidates` - Orders in scan order
    /// * `predicate` - Joint distance/time test for a pair
    ///
    /// # Returns
    /// Groupings in emission order. Every index must appear exactly once and
    /// ineligible candidates must be `Single`.
    fn group(&self, candidates: &[Candidate], predicate: &FeasibilityPredicate) -> Vec<Grouping>;

    /// Get the algorithm name for logging/metrics
    fn name(&self) -> &str;

    /// Whether `a` and `b` may share a rider.
    /// Default implementation checks eligibility, then the predicate
    fn can_pair(&self, a: &Candidate, b: &Candidate, predicate: &FeasibilityPredicate) -> bool {
        a.eligible
            && b.eligible
            && predicate.is_feasible(
                &a.location,
                a.remaining_budget,
                &b.location,
                b.remaining_budget,
            )
    }
}
