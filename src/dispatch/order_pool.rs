// ============================================================================
// Order Pool
// Live working set of orders around the stateless batch matcher
// ============================================================================

use crate::domain::{
    Batch, BatchPlan, BatchingConfig, BatchingError, BatchingResult, Order, OrderId,
    StatusTransition,
};
use crate::engine::{create_from_config, BatchMatcher};
use crate::interfaces::{BatchEvent, EventHandler};
use chrono::Utc;
use crossbeam_skiplist::SkipMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Orders waiting at the hub, kept in arrival order.
///
/// Arrival order is the scan order handed to the matcher. Membership changes
/// take the index write lock, snapshots take the read lock, so a pass never
/// sees an order half added or half removed. Passes are serialized so one
/// order cannot land in two batches.
pub struct OrderPool {
    /// Arrival sequence -> order
    orders: SkipMap<u64, Arc<RwLock<Order>>>,

    /// Order id -> arrival sequence
    index: RwLock<HashMap<OrderId, u64>>,

    sequence: AtomicU64,

    /// Held for the duration of a batching cycle
    pass_lock: Mutex<()>,

    matcher: BatchMatcher,

    event_handler: Arc<dyn EventHandler>,
}

impl OrderPool {
    pub fn new(matcher: BatchMatcher, event_handler: Arc<dyn EventHandler>) -> Self {
        Self {
            orders: SkipMap::new(),
            index: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            pass_lock: Mutex::new(()),
            matcher,
            event_handler,
        }
    }

    /// Build a pool and its matcher from one configuration, sharing the handler
    pub fn from_config(
        config: BatchingConfig,
        event_handler: Arc<dyn EventHandler>,
    ) -> BatchingResult<Self> {
        let matcher = create_from_config(config, Arc::clone(&event_handler))?;
        Ok(Self::new(matcher, event_handler))
    }

    /// Accept an order into the pool. Returns its arrival sequence number.
    pub fn submit(&self, order: Order) -> BatchingResult<u64> {
        let mut index = self.index.write();
        if index.contains_key(&order.id) {
            return Err(BatchingError::DuplicateOrderId(order.id));
        }

        let seq = self.sequence.fetch_add(1, Ordering::AcqRel);
        let order_id = order.id.clone();
        index.insert(order_id.clone(), seq);
        self.orders.insert(seq, Arc::new(RwLock::new(order)));
        drop(index);

        tracing::debug!(%order_id, seq, "order received");
        self.event_handler.on_event(BatchEvent::OrderReceived {
            order_id,
            timestamp: Utc::now(),
        });

        Ok(seq)
    }

    /// Tick every order's budget down by `minutes` of elapsed wall time.
    /// Batched orders keep burning too, so a released batch re-enters
    /// matching with what is really left.
    pub fn advance_clock(&self, minutes: f64) {
        if !(minutes > 0.0) {
            return;
        }

        let _index = self.index.write();
        for entry in self.orders.iter() {
            entry.value().write().consume_budget(minutes);
        }
    }

    /// Consistent copy of the pending orders, in arrival order
    pub fn pending_snapshot(&self) -> Vec<Order> {
        let _index = self.index.read();
        self.orders
            .iter()
            .filter_map(|entry| {
                let order = entry.value().read();
                order.is_pending().then(|| order.clone())
            })
            .collect()
    }

    /// Run one matching pass over the pending orders and mark every batched
    /// order `Batched`.
    ///
    /// A rejected snapshot leaves the pool untouched; the caller retries on
    /// its next tick.
    pub fn run_batching_cycle(&self) -> BatchingResult<BatchPlan> {
        let _pass = self.pass_lock.lock();

        let snapshot = self.pending_snapshot();
        let plan = self.matcher.compute_batches(&snapshot)?;

        let index = self.index.read();
        for batch in &plan.batches {
            for order_id in &batch.members {
                let order = self.entry(&index, order_id)?;
                order.write().apply(StatusTransition::Assign)?;
            }
        }

        Ok(plan)
    }

    /// Hand a batch to a rider: its orders leave the pool as `Dispatched`
    pub fn dispatch(&self, batch: &Batch) -> BatchingResult<Vec<Order>> {
        let mut index = self.index.write();
        self.check_batched(&index, batch, StatusTransition::Dispatch)?;

        let mut dispatched = Vec::with_capacity(batch.members.len());
        for order_id in &batch.members {
            let Some(seq) = index.remove(order_id) else {
                continue;
            };
            if let Some(entry) = self.orders.remove(&seq) {
                let mut order = entry.value().write().clone();
                order.apply(StatusTransition::Dispatch)?;
                dispatched.push(order);
            }
        }
        drop(index);

        self.event_handler.on_event(BatchEvent::BatchDispatched {
            batch_id: batch.id,
            order_ids: batch.members.to_vec(),
            timestamp: Utc::now(),
        });

        Ok(dispatched)
    }

    /// Dissolve a batch that could not be dispatched; its orders become
    /// pending and are considered again by the next cycle
    pub fn release(&self, batch: &Batch) -> BatchingResult<()> {
        let index = self.index.write();
        self.check_batched(&index, batch, StatusTransition::Release)?;

        for order_id in &batch.members {
            let order = self.entry(&index, order_id)?;
            order.write().apply(StatusTransition::Release)?;
        }
        drop(index);

        self.event_handler.on_event(BatchEvent::BatchReleased {
            batch_id: batch.id,
            order_ids: batch.members.to_vec(),
            timestamp: Utc::now(),
        });

        Ok(())
    }

    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        let index = self.index.read();
        self.entry(&index, order_id)
            .ok()
            .map(|order| order.read().clone())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|entry| entry.value().read().is_pending())
            .count()
    }

    pub fn matcher(&self) -> &BatchMatcher {
        &self.matcher
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn entry(
        &self,
        index: &HashMap<OrderId, u64>,
        order_id: &OrderId,
    ) -> BatchingResult<Arc<RwLock<Order>>> {
        index
            .get(order_id)
            .and_then(|seq| self.orders.get(seq))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BatchingError::UnknownOrder(order_id.clone()))
    }

    /// All-or-nothing precheck so a batch is never half transitioned
    fn check_batched(
        &self,
        index: &HashMap<OrderId, u64>,
        batch: &Batch,
        transition: StatusTransition,
    ) -> BatchingResult<()> {
        for order_id in &batch.members {
            let order = self.entry(index, order_id)?;
            let status = order.read().status;
            if status.transition(transition).is_none() {
                return Err(BatchingError::InvalidTransition {
                    order_id: order_id.clone(),
                    from: status,
                    transition,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BatchKind, OrderStatus};
    use crate::interfaces::{ChannelEventHandler, NoOpEventHandler};
    use crossbeam::channel::unbounded;
    use rust_decimal::Decimal;

    fn pool() -> OrderPool {
        OrderPool::from_config(BatchingConfig::default(), Arc::new(NoOpEventHandler)).unwrap()
    }

    #[test]
    fn test_submit_and_snapshot_in_arrival_order() {
        let pool = pool();
        pool.submit(Order::new("C", 9.0, 9.0, 5.0)).unwrap();
        pool.submit(Order::new("A", 0.0, 0.0, 20.0)).unwrap();
        pool.submit(Order::new("B", 1.0, 1.0, 20.0)).unwrap();

        let ids: Vec<String> = pool
            .pending_snapshot()
            .into_iter()
            .map(|o| o.id.to_string())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.pending_count(), 3);
    }

    #[test]
    fn test_duplicate_submission_is_rejected() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 20.0)).unwrap();

        let err = pool.submit(Order::new("A", 5.0, 5.0, 20.0)).unwrap_err();

        assert_eq!(err, BatchingError::DuplicateOrderId(OrderId::from("A")));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&OrderId::from("A")).unwrap().location.x, 0.0);
    }

    #[test]
    fn test_cycle_assigns_and_next_cycle_sees_only_new_orders() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 20.0)).unwrap();
        pool.submit(Order::new("B", 1.0, 1.0, 20.0)).unwrap();
        pool.submit(Order::new("C", 9.0, 9.0, 5.0)).unwrap();

        let plan = pool.run_batching_cycle().unwrap();
        assert_eq!(plan.paired_count(), 1);
        assert_eq!(pool.pending_count(), 0);
        assert_eq!(
            pool.get(&OrderId::from("A")).unwrap().status,
            OrderStatus::Batched
        );

        pool.submit(Order::new("D", 9.0, 8.0, 30.0)).unwrap();
        let plan = pool.run_batching_cycle().unwrap();
        assert_eq!(plan.partition(), vec![vec![OrderId::from("D")]]);
    }

    #[test]
    fn test_dispatch_removes_orders() {
        let (tx, rx) = unbounded();
        let pool =
            OrderPool::from_config(BatchingConfig::default(), Arc::new(ChannelEventHandler::new(tx)))
                .unwrap();
        pool.submit(Order::new("A", 0.0, 0.0, 20.0)).unwrap();
        pool.submit(Order::new("B", 1.0, 1.0, 20.0)).unwrap();

        let plan = pool.run_batching_cycle().unwrap();
        let batch = &plan.batches[0];
        assert_eq!(batch.kind, BatchKind::Paired);

        let dispatched = pool.dispatch(batch).unwrap();

        assert_eq!(dispatched.len(), 2);
        assert!(dispatched.iter().all(|o| o.status == OrderStatus::Dispatched));
        assert!(pool.is_empty());
        assert!(pool.get(&OrderId::from("A")).is_none());
        assert!(rx
            .try_iter()
            .any(|e| matches!(e, BatchEvent::BatchDispatched { .. })));

        // already gone
        assert!(matches!(
            pool.dispatch(batch),
            Err(BatchingError::UnknownOrder(_))
        ));
    }

    #[test]
    fn test_dispatch_requires_batched_orders() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 20.0)).unwrap();

        let err = pool.dispatch(&Batch::single(OrderId::from("A"))).unwrap_err();

        assert!(matches!(err, BatchingError::InvalidTransition { .. }));
        assert_eq!(
            pool.get(&OrderId::from("A")).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_release_returns_orders_to_next_cycle() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 20.0)).unwrap();
        pool.submit(Order::new("B", 1.0, 1.0, 20.0)).unwrap();

        let plan = pool.run_batching_cycle().unwrap();
        pool.release(&plan.batches[0]).unwrap();
        assert_eq!(pool.pending_count(), 2);

        let again = pool.run_batching_cycle().unwrap();
        assert_eq!(again.partition(), plan.partition());
    }

    #[test]
    fn test_partial_batch_is_not_half_released() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 20.0)).unwrap();
        pool.submit(Order::new("B", 10.0, 10.0, 20.0)).unwrap();
        pool.run_batching_cycle().unwrap();
        pool.submit(Order::new("C", 0.0, 1.0, 20.0)).unwrap();

        // A is batched, C is still pending
        let bogus = Batch::paired(OrderId::from("A"), OrderId::from("C"), Decimal::ONE);
        assert!(pool.release(&bogus).is_err());
        assert_eq!(
            pool.get(&OrderId::from("A")).unwrap().status,
            OrderStatus::Batched
        );
    }

    #[test]
    fn test_advance_clock_can_block_a_pairing() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 8.0)).unwrap();
        pool.submit(Order::new("B", 1.0, 0.0, 20.0)).unwrap();

        // joint time 7; A drops from 8 to 6
        pool.advance_clock(2.0);
        assert_eq!(pool.get(&OrderId::from("A")).unwrap().remaining_budget, 6.0);

        let plan = pool.run_batching_cycle().unwrap();
        assert_eq!(plan.paired_count(), 0);
        assert_eq!(plan.single_count(), 2);
    }

    #[test]
    fn test_batched_orders_keep_burning_budget_until_released() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 8.0)).unwrap();
        pool.submit(Order::new("B", 1.0, 0.0, 20.0)).unwrap();

        let plan = pool.run_batching_cycle().unwrap();
        assert_eq!(plan.paired_count(), 1);

        pool.advance_clock(2.0);
        assert_eq!(pool.get(&OrderId::from("A")).unwrap().remaining_budget, 6.0);
        assert_eq!(pool.get(&OrderId::from("B")).unwrap().remaining_budget, 18.0);

        pool.release(&plan.batches[0]).unwrap();
        let again = pool.run_batching_cycle().unwrap();
        assert_eq!(again.paired_count(), 0);
    }

    #[test]
    fn test_advance_clock_ignores_non_positive_ticks() {
        let pool = pool();
        pool.submit(Order::new("A", 0.0, 0.0, 8.0)).unwrap();

        pool.advance_clock(0.0);
        pool.advance_clock(-3.0);
        pool.advance_clock(f64::NAN);

        assert_eq!(pool.get(&OrderId::from("A")).unwrap().remaining_budget, 8.0);
    }

    #[test]
    fn test_concurrent_submissions_and_cycles_never_double_assign() {
        let pool = Arc::new(pool());
        let plans = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let pool = Arc::clone(&pool);
                let plans = Arc::clone(&plans);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let id = format!("T{}-{}", t, i);
                        pool.submit(Order::new(id, f64::from(i % 5), f64::from(t), 30.0))
                            .unwrap();
                        if i % 5 == 4 {
                            let plan = pool.run_batching_cycle().unwrap();
                            plans.lock().push(plan);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        plans.lock().push(pool.run_batching_cycle().unwrap());

        let mut seen = std::collections::HashSet::new();
        for plan in plans.lock().iter() {
            for batch in &plan.batches {
                for id in &batch.members {
                    assert!(seen.insert(id.clone()), "{} batched twice", id);
                }
            }
        }
        assert_eq!(seen.len(), 100);
        assert_eq!(pool.pending_count(), 0);
    }
}
