// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use self::state::{OrderStatus, StatusTransition};
use super::{BatchingError, BatchingResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Opaque order identifier, stable for the lifetime of the order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh `ORD-<uuid>` identifier
    pub fn generate() -> Self {
        Self(format!("ORD-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point in the store-relative planar grid
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Grid (L1) distance: riders move along two perpendicular axes
    pub fn manhattan_distance(&self, other: &Location) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Why an order could not take part in pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DegradeReason {
    NonFiniteLocation,
    NonFiniteBudget,
    NegativeBudget,
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::NonFiniteLocation => write!(f, "location is not finite"),
            DegradeReason::NonFiniteBudget => write!(f, "remaining budget is not finite"),
            DegradeReason::NegativeBudget => write!(f, "remaining budget is negative"),
        }
    }
}

// ============================================================================
// Order Status State Machine
// ============================================================================

pub mod state {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum OrderStatus {
        /// Waiting for a batching decision
        Pending,
        /// Assigned to a batch, rider not yet gone
        Batched,
        /// Left the hub
        Dispatched,
    }

    impl OrderStatus {
        pub fn is_terminal(&self) -> bool {
            matches!(self, OrderStatus::Dispatched)
        }

        pub fn is_batchable(&self) -> bool {
            matches!(self, OrderStatus::Pending)
        }
    }

    /// Valid transitions for the order status machine
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum StatusTransition {
        Assign,
        Release,
        Dispatch,
    }

    impl OrderStatus {
        /// Returns the next status, or `None` if the transition is illegal
        pub fn transition(&self, transition: StatusTransition) -> Option<OrderStatus> {
            match (self, transition) {
                (OrderStatus::Pending, StatusTransition::Assign) => Some(OrderStatus::Batched),
                (OrderStatus::Batched, StatusTransition::Release) => Some(OrderStatus::Pending),
                (OrderStatus::Batched, StatusTransition::Dispatch) => {
                    Some(OrderStatus::Dispatched)
                },
                _ => None,
            }
        }
    }
}

// ============================================================================
// Order Entity
// ============================================================================

/// A delivery waiting at the hub.
///
/// Plain value record: identity lives in `id`, never in its position inside
/// some container, so upstream filtering or reordering is harmless.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub location: Location,
    /// Minutes left before the order is late
    pub remaining_budget: f64,
    pub status: OrderStatus,
    pub received_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, x: f64, y: f64, remaining_budget: f64) -> Self {
        Self {
            id: id.into(),
            location: Location::new(x, y),
            remaining_budget,
            status: OrderStatus::Pending,
            received_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Check numeric fields; `Some` means the order must not be paired
    pub fn validate(&self) -> Option<DegradeReason> {
        if !self.location.is_finite() {
            return Some(DegradeReason::NonFiniteLocation);
        }
        if !self.remaining_budget.is_finite() {
            return Some(DegradeReason::NonFiniteBudget);
        }
        if self.remaining_budget < 0.0 {
            return Some(DegradeReason::NegativeBudget);
        }
        None
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_batchable()
    }

    /// Apply a status transition in place
    pub fn apply(&mut self, transition: StatusTransition) -> BatchingResult<OrderStatus> {
        let next = self
            .status
            .transition(transition)
            .ok_or_else(|| BatchingError::InvalidTransition {
                order_id: self.id.clone(),
                from: self.status,
                transition,
            })?;
        self.status = next;
        Ok(next)
    }

    /// Burn `minutes` off the budget, never going below zero.
    /// Malformed budgets are left as they are so they stay flagged.
    pub fn consume_budget(&mut self, minutes: f64) {
        if self.remaining_budget.is_finite() && self.remaining_budget >= 0.0 {
            self.remaining_budget = (self.remaining_budget - minutes).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_creation() {
        let order = Order::new("ORD-101", 2.0, 3.0, 15.0);

        assert_eq!(order.id, OrderId::from("ORD-101"));
        assert_eq!(order.location, Location::new(2.0, 3.0));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.validate().is_none());
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(1.0, 1.0);
        let c = Location::new(9.0, 9.0);

        assert_eq!(a.manhattan_distance(&b), 2.0);
        assert_eq!(a.manhattan_distance(&c), 18.0);
        assert_eq!(c.manhattan_distance(&b), 16.0);
        assert_eq!(Location::new(-3.0, 2.0).manhattan_distance(&a), 5.0);
    }

    #[test]
    fn test_validation_flags_malformed_fields() {
        assert_eq!(
            Order::new("A", f64::NAN, 0.0, 10.0).validate(),
            Some(DegradeReason::NonFiniteLocation)
        );
        assert_eq!(
            Order::new("A", 0.0, f64::INFINITY, 10.0).validate(),
            Some(DegradeReason::NonFiniteLocation)
        );
        assert_eq!(
            Order::new("A", 0.0, 0.0, f64::NAN).validate(),
            Some(DegradeReason::NonFiniteBudget)
        );
        assert_eq!(
            Order::new("A", 0.0, 0.0, -1.0).validate(),
            Some(DegradeReason::NegativeBudget)
        );
        // zero is late-but-valid
        assert!(Order::new("A", 0.0, 0.0, 0.0).validate().is_none());
    }

    #[test]
    fn test_status_transitions() {
        let mut order = Order::new("A", 0.0, 0.0, 10.0);

        assert_eq!(order.apply(StatusTransition::Assign), Ok(OrderStatus::Batched));
        assert_eq!(order.apply(StatusTransition::Release), Ok(OrderStatus::Pending));
        assert_eq!(order.apply(StatusTransition::Assign), Ok(OrderStatus::Batched));
        assert_eq!(
            order.apply(StatusTransition::Dispatch),
            Ok(OrderStatus::Dispatched)
        );
        assert!(order.status.is_terminal());

        let err = order.apply(StatusTransition::Release).unwrap_err();
        assert!(matches!(err, BatchingError::InvalidTransition { .. }));
        assert_eq!(order.status, OrderStatus::Dispatched);
    }

    #[test]
    fn test_pending_cannot_dispatch() {
        let mut order = Order::new("A", 0.0, 0.0, 10.0);
        assert!(order.apply(StatusTransition::Dispatch).is_err());
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_consume_budget_floors_at_zero() {
        let mut order = Order::new("A", 0.0, 0.0, 3.0);
        order.consume_budget(2.0);
        assert_eq!(order.remaining_budget, 1.0);
        order.consume_budget(5.0);
        assert_eq!(order.remaining_budget, 0.0);

        let mut broken = Order::new("B", 0.0, 0.0, -2.0);
        broken.consume_budget(1.0);
        assert_eq!(broken.remaining_budget, -2.0);

        let mut broken = Order::new("C", 0.0, 0.0, f64::NAN);
        broken.consume_budget(1.0);
        assert!(broken.remaining_budget.is_nan());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = OrderId::generate();
        let b = OrderId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("ORD-"));
    }
}
