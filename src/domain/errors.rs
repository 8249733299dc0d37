// ============================================================================
// Batching Errors
// Error types surfaced by the matcher and the order pool
// ============================================================================

use thiserror::Error;

use super::order::state::{OrderStatus, StatusTransition};
use super::OrderId;

/// Errors that abort a batching call or a lifecycle operation.
///
/// A malformed numeric field on a single order is NOT an error: that order
/// is degraded to a lone batch and the pass carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchingError {
    /// The same order id appeared twice in one snapshot
    #[error("duplicate order id in snapshot: {0}")]
    DuplicateOrderId(OrderId),

    /// Configuration failed validation
    #[error("invalid batching configuration: {0}")]
    InvalidConfig(String),

    /// Illegal order status transition
    #[error("invalid status transition for {order_id}: {from:?} via {transition:?}")]
    InvalidTransition {
        order_id: OrderId,
        from: OrderStatus,
        transition: StatusTransition,
    },

    /// Order id not present in the pool
    #[error("unknown order: {0}")]
    UnknownOrder(OrderId),

    /// A batching algorithm dropped or duplicated an order
    #[error("algorithm '{algorithm}' produced an invalid partition: {detail}")]
    PartitionViolation { algorithm: String, detail: String },
}

/// Result type alias for batching operations
pub type BatchingResult<T> = Result<T, BatchingError>;
