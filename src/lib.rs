// ============================================================================
// Order Batching Library
// Deadline-aware pairing of pending deliveries onto a single rider
// ============================================================================

//! # Order Batching
//!
//! Decides which pending delivery orders can share one rider without either
//! order going late.
//!
//! ## Features
//!
//! - **Greedy nearest-partner matching** with a documented scan order and
//!   tie-break rule, so results are reproducible
//! - **Joint distance/time feasibility** on a Manhattan grid
//! - **Pluggable batching algorithms** behind a strategy trait
//! - **Live order pool** with serialized passes and a status lifecycle
//! - **Event stream** for audit and monitoring
//!
//! ## Example
//!
//! ```rust
//! use order_batching::prelude::*;
//! use std::sync::Arc;
//!
//! let matcher = create_from_config(BatchingConfig::default(), Arc::new(NoOpEventHandler))
//!     .unwrap();
//!
//! let orders = vec![
//!     Order::new("A", 0.0, 0.0, 20.0),
//!     Order::new("B", 1.0, 1.0, 20.0),
//!     Order::new("C", 9.0, 9.0, 5.0),
//! ];
//!
//! let plan = matcher.compute_batches(&orders).unwrap();
//! assert_eq!(plan.paired_count(), 1);
//! assert_eq!(plan.single_count(), 1);
//! println!("Saving: {}", plan.total_saving());
//! ```

pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::dispatch::OrderPool;
    #[cfg(feature = "async")]
    pub use crate::dispatch::{BatchingScheduler, SchedulerHandle};
    pub use crate::domain::{
        Batch, BatchKind, BatchPlan, BatchingConfig, BatchingError, BatchingResult,
        DegradeReason, Location, MatchingStrategyType, Order, OrderId, OrderStatus, ScanOrder,
        StatusTransition,
    };
    pub use crate::engine::{
        create_from_config, BatchMatcher, BatchMatcherBuilder, FeasibilityPredicate,
        FirstFeasible, GreedyNearest,
    };
    pub use crate::interfaces::{
        BatchEvent, BatchingAlgorithm, Candidate, ChannelEventHandler, EventHandler, Grouping,
        LoggingEventHandler, NoOpEventHandler,
    };
}
