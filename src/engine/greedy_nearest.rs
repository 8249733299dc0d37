// ============================================================================
// Greedy Nearest-Partner Batching
// Single pass, scan-order sensitive pairing
// ============================================================================

use crate::engine::FeasibilityPredicate;
use crate::interfaces::{BatchingAlgorithm, Candidate, Grouping};

/// Greedy nearest-partner algorithm
///
/// Visits candidates in scan order. Each unassigned candidate takes the
/// closest still-unassigned feasible partner; on equal distance the partner
/// met first in scan order wins because the running best only moves on a
/// strict improvement. With no feasible partner the candidate goes alone.
///
/// # Example
/// ```text
/// A (0,0) budget 20
/// B (1,1) budget 20     d(A,B) = 2, joint 9  -> feasible
/// C (9,9) budget 5      d(A,C) = 18          -> out of range
///
/// Result: Pair(A, B), Single(C)
/// ```
///
/// Not globally optimal: an early pairing can strand an order that a
/// different partition would have paired. O(n²) per pass.
#[derive(Debug, Default)]
pub struct GreedyNearest;

impl GreedyNearest {
    pub fn new() -> Self {
        Self
    }
}

impl BatchingAlgorithm for GreedyNearest {
    fn group(&self, candidates: &[Candidate], predicate: &FeasibilityPredicate) -> Vec<Grouping> {
        let mut assigned = vec![false; candidates.len()];
        let mut groupings = Vec::with_capacity(candidates.len());

        for (i, a) in candidates.iter().enumerate() {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;

            if !a.eligible {
                groupings.push(Grouping::Single(i));
                continue;
            }

            let mut best: Option<(usize, f64)> = None;
            for (j, b) in candidates.iter().enumerate() {
                if assigned[j] || !b.eligible {
                    continue;
                }
                let Some(distance) =
                    predicate.evaluate(&a.location, a.remaining_budget, &b.location, b.remaining_budget)
                else {
                    continue;
                };

                match best {
                    Some((_, best_distance)) if distance >= best_distance => {},
                    _ => best = Some((j, distance)),
                }
            }

            match best {
                Some((j, _)) => {
                    assigned[j] = true;
                    groupings.push(Grouping::Pair(i, j));
                },
                None => groupings.push(Grouping::Single(i)),
            }
        }

        groupings
    }

    fn name(&self) -> &str {
        "GreedyNearest"
    }
}
