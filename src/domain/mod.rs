// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod batch;
pub mod config;
pub mod errors;
pub mod order;

pub use batch::{Batch, BatchKind, BatchPlan, MAX_BATCH_SIZE};
pub use config::{BatchingConfig, MatchingStrategyType, ScanOrder};
pub use errors::{BatchingError, BatchingResult};
pub use order::{DegradeReason, Location, Order, OrderId};

// Re-export state machine
pub use order::state::{OrderStatus, StatusTransition};
