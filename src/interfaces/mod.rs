// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod batching_algorithm;
mod event_handler;

pub use batching_algorithm::{BatchingAlgorithm, Candidate, Grouping};
pub use event_handler::{
    BatchEvent, ChannelEventHandler, EventHandler, LoggingEventHandler, NoOpEventHandler,
};
