// ============================================================================
// Batch Domain Model
// ============================================================================

use arrayvec::ArrayVec;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::OrderId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum stops one rider serves in a batch
pub const MAX_BATCH_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BatchKind {
    Single,
    Paired,
}

/// One rider assignment produced by a matching pass
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Batch {
    pub id: Uuid,
    pub kind: BatchKind,
    /// Scanning order first, its partner second
    pub members: ArrayVec<OrderId, MAX_BATCH_SIZE>,
    /// Rider cost saved; zero for singles
    pub estimated_saving: Decimal,
    /// Set when the order was forced alone because of malformed fields
    pub degraded: bool,
}

impl Batch {
    pub fn single(order_id: OrderId) -> Self {
        let mut members = ArrayVec::new();
        members.push(order_id);
        Self {
            id: Uuid::new_v4(),
            kind: BatchKind::Single,
            members,
            estimated_saving: Decimal::ZERO,
            degraded: false,
        }
    }

    pub fn paired(first: OrderId, second: OrderId, saving: Decimal) -> Self {
        debug_assert_ne!(first, second, "paired batch needs distinct orders");
        let mut members = ArrayVec::new();
        members.push(first);
        members.push(second);
        Self {
            id: Uuid::new_v4(),
            kind: BatchKind::Paired,
            members,
            estimated_saving: saving,
            degraded: false,
        }
    }

    pub fn degraded(order_id: OrderId) -> Self {
        Self {
            degraded: true,
            ..Self::single(order_id)
        }
    }

    pub fn is_paired(&self) -> bool {
        self.kind == BatchKind::Paired
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.members.iter().any(|m| m == order_id)
    }
}

/// Result of one matching pass over a snapshot
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatchPlan {
    pub pass_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub algorithm: String,
    /// Batches in emission (scan) order
    pub batches: Vec<Batch>,
    /// Non-pending orders that were present in the input but not batched
    pub skipped: Vec<OrderId>,
}

impl BatchPlan {
    pub fn new(algorithm: impl Into<String>, batches: Vec<Batch>, skipped: Vec<OrderId>) -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            computed_at: Utc::now(),
            algorithm: algorithm.into(),
            batches,
            skipped,
        }
    }

    pub fn paired_count(&self) -> usize {
        self.batches.iter().filter(|b| b.is_paired()).count()
    }

    pub fn single_count(&self) -> usize {
        self.batches.len() - self.paired_count()
    }

    /// Number of orders covered by the plan
    pub fn order_count(&self) -> usize {
        self.batches.iter().map(|b| b.members.len()).sum()
    }

    pub fn total_saving(&self) -> Decimal {
        self.batches.iter().map(|b| b.estimated_saving).sum()
    }

    /// Member lists only, for comparing two passes independent of batch ids
    pub fn partition(&self) -> Vec<Vec<OrderId>> {
        self.batches
            .iter()
            .map(|b| b.members.iter().cloned().collect())
            .collect()
    }

    pub fn batch_for(&self, order_id: &OrderId) -> Option<&Batch> {
        self.batches.iter().find(|b| b.contains(order_id))
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
