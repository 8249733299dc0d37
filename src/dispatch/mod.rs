// ============================================================================
// Dispatch Module
// Order lifecycle around the matcher: pool, cycles, scheduling
// ============================================================================

mod order_pool;
#[cfg(feature = "async")]
mod scheduler;

pub use order_pool::OrderPool;
#[cfg(feature = "async")]
pub use scheduler::{BatchingScheduler, SchedulerHandle};
