// ============================================================================
// Batching Scheduler
// Re-runs batching on a fixed tick while orders arrive and budgets burn down
// ============================================================================

use crate::domain::{BatchPlan, BatchingError, BatchingResult};
use crate::dispatch::OrderPool;
use crossbeam::channel::Sender;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Periodic driver for an `OrderPool`.
///
/// Each tick burns the elapsed wall time off every budget, runs one cycle
/// and forwards the plan. A rejected snapshot is logged and skipped; the next
/// tick tries again.
pub struct BatchingScheduler;

impl BatchingScheduler {
    /// Spawn the loop on the current tokio runtime.
    ///
    /// Fails with `InvalidConfig` for a zero interval.
    pub fn spawn(
        pool: Arc<OrderPool>,
        interval: Duration,
        plans: Sender<BatchPlan>,
    ) -> BatchingResult<SchedulerHandle> {
        if interval.is_zero() {
            return Err(BatchingError::InvalidConfig(
                "scheduler interval must be greater than zero".to_string(),
            ));
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_tick = Instant::now();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {},
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                let now = Instant::now();
                let elapsed_minutes = now.duration_since(last_tick).as_secs_f64() / 60.0;
                last_tick = now;
                pool.advance_clock(elapsed_minutes);

                match pool.run_batching_cycle() {
                    Ok(plan) => {
                        if plan.batches.is_empty() {
                            continue;
                        }
                        if plans.send(plan).is_err() {
                            tracing::debug!("plan receiver dropped, stopping scheduler");
                            break;
                        }
                    },
                    Err(err) => {
                        tracing::warn!(error = %err, "batching cycle skipped");
                    },
                }
            }
        });

        Ok(SchedulerHandle { shutdown_tx, join })
    }
}

/// Handle to a running scheduler
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop after the cycle in progress, if any
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.join.await {
            tracing::warn!(error = %err, "scheduler task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
