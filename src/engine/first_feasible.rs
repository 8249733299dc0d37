// ============================================================================
// First-Feasible Batching
// Baseline strategy: no distance ranking
// ============================================================================

use crate::engine::FeasibilityPredicate;
use crate::interfaces::{BatchingAlgorithm, Candidate, Grouping};

/// First-feasible pairing
///
/// Like `GreedyNearest` but stops at the first feasible partner found in
/// scan order. Cheaper on average and useful as a comparison baseline.
#[derive(Debug, Default)]
pub struct FirstFeasible;

impl FirstFeasible {
    pub fn new() -> Self {
        Self
    }
}

impl BatchingAlgorithm for FirstFeasible {
    fn group(&self, candidates: &[Candidate], predicate: &FeasibilityPredicate) -> Vec<Grouping> {
        let mut assigned = vec![false; candidates.len()];
        let mut groupings = Vec::with_capacity(candidates.len());

        for (i, a) in candidates.iter().enumerate() {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;

            let partner = candidates
                .iter()
                .enumerate()
                .find(|(j, b)| !assigned[*j] && self.can_pair(a, b, predicate))
                .map(|(j, _)| j);

            match partner {
                Some(j) => {
                    assigned[j] = true;
                    groupings.push(Grouping::Pair(i, j));
                },
                None => groupings.push(Grouping::Single(i)),
            }
        }

        groupings
    }

    fn name(&self) -> &str {
        "FirstFeasible"
    }
}
