// ============================================================================
// Event Handler Interface
// Defines the contract for handling batching and lifecycle events
// ============================================================================

use crate::domain::{Batch, DegradeReason, OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use crossbeam::channel::Sender;
use rust_decimal::Decimal;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the batch matcher and the order pool
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BatchEvent {
    /// Matching pass started over a snapshot
    PassStarted {
        pass_id: Uuid,
        order_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Snapshot rejected; no batching performed this cycle
    PassRejected {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Order had malformed fields and was forced into a lone batch
    OrderDegraded {
        order_id: OrderId,
        reason: DegradeReason,
        timestamp: DateTime<Utc>,
    },

    /// Order was not pending and took no part in the pass
    OrderSkipped {
        order_id: OrderId,
        status: OrderStatus,
        timestamp: DateTime<Utc>,
    },

    /// Batch decided
    BatchFormed {
        pass_id: Uuid,
        batch: Batch,
        timestamp: DateTime<Utc>,
    },

    /// Matching pass finished
    PassCompleted {
        pass_id: Uuid,
        batch_count: usize,
        paired_count: usize,
        total_saving: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// Order accepted into the pool
    OrderReceived {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Batch handed to a rider
    BatchDispatched {
        batch_id: Uuid,
        order_ids: Vec<OrderId>,
        timestamp: DateTime<Utc>,
    },

    /// Batch dissolved; members are pending again
    BatchReleased {
        batch_id: Uuid,
        order_ids: Vec<OrderId>,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing batching events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle a batching event
    fn on_event(&self, event: BatchEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<BatchEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: BatchEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: BatchEvent) {
        match &event {
            BatchEvent::OrderDegraded {
                order_id, reason, ..
            } => {
                tracing::warn!(%order_id, %reason, "order degraded to single batch");
            },
            BatchEvent::PassRejected { reason, .. } => {
                tracing::warn!(%reason, "batching pass rejected");
            },
            BatchEvent::PassCompleted {
                pass_id,
                batch_count,
                paired_count,
                total_saving,
                ..
            } => {
                tracing::info!(
                    %pass_id,
                    batch_count,
                    paired_count,
                    %total_saving,
                    "batching pass completed"
                );
            },
            _ => tracing::debug!("Batch matcher event: {:?}", event),
        }
    }
}

/// Forwards every event onto a crossbeam channel.
/// Events are dropped once the receiving side hangs up.
pub struct ChannelEventHandler {
    sender: Sender<BatchEvent>,
}

impl ChannelEventHandler {
    pub fn new(sender: Sender<BatchEvent>) -> Self {
        Self { sender }
    }
}

impl EventHandler for ChannelEventHandler {
    fn on_event(&self, event: BatchEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event receiver disconnected");
        }
    }
}
