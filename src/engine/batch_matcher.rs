// ============================================================================
// Batch Matcher
// Turns a snapshot of pending orders into rider batches
// ============================================================================

use crate::domain::{
    Batch, BatchPlan, BatchingConfig, BatchingError, BatchingResult, Order, OrderId, ScanOrder,
};
use crate::engine::FeasibilityPredicate;
use crate::interfaces::{BatchEvent, BatchingAlgorithm, Candidate, EventHandler, Grouping};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

/// Stateless matcher with a pluggable pairing algorithm.
///
/// Every call works on its own snapshot; the caller owns the orders and
/// their lifecycle. Two calls on the same input yield the same partition.
pub struct BatchMatcher {
    config: BatchingConfig,

    /// Derived from `config`
    predicate: FeasibilityPredicate,

    /// Pluggable pairing algorithm
    algorithm: Box<dyn BatchingAlgorithm>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,
}

impl BatchMatcher {
    /// Create a new batch matcher. The configuration is assumed valid; use
    /// the factory to get validation.
    pub fn new(
        config: BatchingConfig,
        algorithm: Box<dyn BatchingAlgorithm>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            predicate: FeasibilityPredicate::from_config(&config),
            config,
            algorithm,
            event_handler,
        }
    }

    /// Partition the pending orders of `orders` into batches.
    ///
    /// Duplicate ids reject the whole call. Orders with malformed numeric
    /// fields are batched alone with zero saving. Orders that are not
    /// `Pending` are left out and reported in `BatchPlan::skipped`.
    pub fn compute_batches(&self, orders: &[Order]) -> BatchingResult<BatchPlan> {
        if let Err(err) = reject_duplicates(orders) {
            self.event_handler.on_event(BatchEvent::PassRejected {
                reason: err.to_string(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        let mut events = Vec::new();
        let mut skipped = Vec::new();
        let mut pending: Vec<&Order> = Vec::with_capacity(orders.len());

        for order in orders {
            if order.is_pending() {
                pending.push(order);
            } else {
                skipped.push(order.id.clone());
                events.push(BatchEvent::OrderSkipped {
                    order_id: order.id.clone(),
                    status: order.status,
                    timestamp: Utc::now(),
                });
            }
        }

        let scanned = self.scan(pending);
        let candidates: Vec<Candidate> = scanned
            .iter()
            .map(|order| {
                let degraded = order.validate();
                if let Some(reason) = degraded {
                    events.push(BatchEvent::OrderDegraded {
                        order_id: order.id.clone(),
                        reason,
                        timestamp: Utc::now(),
                    });
                }
                Candidate {
                    location: order.location,
                    remaining_budget: order.remaining_budget,
                    eligible: degraded.is_none(),
                }
            })
            .collect();

        let groupings = self.algorithm.group(&candidates, &self.predicate);
        if let Err(err) = self.verify_partition(&groupings, &candidates) {
            tracing::error!(error = %err, "batching algorithm broke the partition");
            self.event_handler.on_event(BatchEvent::PassRejected {
                reason: err.to_string(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        let batches: Vec<Batch> = groupings
            .into_iter()
            .map(|grouping| match grouping {
                Grouping::Pair(i, j) => Batch::paired(
                    scanned[i].id.clone(),
                    scanned[j].id.clone(),
                    self.config.rider_cost,
                ),
                Grouping::Single(i) if !candidates[i].eligible => {
                    Batch::degraded(scanned[i].id.clone())
                },
                Grouping::Single(i) => Batch::single(scanned[i].id.clone()),
            })
            .collect();

        let plan = BatchPlan::new(self.algorithm.name(), batches, skipped);

        let mut pass_events = Vec::with_capacity(events.len() + plan.batches.len() + 2);
        pass_events.push(BatchEvent::PassStarted {
            pass_id: plan.pass_id,
            order_count: scanned.len(),
            timestamp: plan.computed_at,
        });
        pass_events.append(&mut events);
        pass_events.extend(plan.batches.iter().map(|batch| BatchEvent::BatchFormed {
            pass_id: plan.pass_id,
            batch: batch.clone(),
            timestamp: Utc::now(),
        }));
        pass_events.push(BatchEvent::PassCompleted {
            pass_id: plan.pass_id,
            batch_count: plan.batches.len(),
            paired_count: plan.paired_count(),
            total_saving: plan.total_saving(),
            timestamp: Utc::now(),
        });
        self.event_handler.on_events(pass_events);

        Ok(plan)
    }

    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    pub fn predicate(&self) -> &FeasibilityPredicate {
        &self.predicate
    }

    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn scan<'a>(&self, mut pending: Vec<&'a Order>) -> Vec<&'a Order> {
        match self.config.scan_order {
            ScanOrder::AsGiven => {},
            // stable: equal budgets keep input order
            ScanOrder::MostUrgentFirst => pending.sort_by(|a, b| urgency(a, b)),
        }
        pending
    }

    fn verify_partition(&self, groupings: &[Grouping], candidates: &[Candidate]) -> BatchingResult<()> {
        let violation = |detail: String| BatchingError::PartitionViolation {
            algorithm: self.algorithm.name().to_string(),
            detail,
        };

        let mut seen = vec![false; candidates.len()];
        let mut claim = |i: usize| -> BatchingResult<()> {
            match seen.get_mut(i) {
                None => Err(violation(format!("index {} out of range", i))),
                Some(true) => Err(violation(format!("index {} grouped twice", i))),
                Some(slot) => {
                    *slot = true;
                    Ok(())
                },
            }
        };

        for grouping in groupings {
            match *grouping {
                Grouping::Single(i) => claim(i)?,
                Grouping::Pair(i, j) => {
                    if i == j {
                        return Err(violation(format!("index {} paired with itself", i)));
                    }
                    claim(i)?;
                    claim(j)?;
                    if !candidates[i].eligible || !candidates[j].eligible {
                        return Err(violation(format!(
                            "malformed order paired ({}, {})",
                            i, j
                        )));
                    }
                },
            }
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(violation(format!("index {} dropped", missing)));
        }

        Ok(())
    }
}

fn reject_duplicates(orders: &[Order]) -> BatchingResult<()> {
    let mut ids: HashSet<&OrderId> = HashSet::with_capacity(orders.len());
    for order in orders {
        if !ids.insert(&order.id) {
            return Err(BatchingError::DuplicateOrderId(order.id.clone()));
        }
    }
    Ok(())
}

/// Ascending budget; NaN budgets sort last, `-0.0` ties with `0.0`
fn urgency(a: &Order, b: &Order) -> Ordering {
    match a.remaining_budget.partial_cmp(&b.remaining_budget) {
        Some(ordering) => ordering,
        None => a
            .remaining_budget
            .is_nan()
            .cmp(&b.remaining_budget.is_nan()),
    }
}
