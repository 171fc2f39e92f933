//! Dispatch scheduler — binds pending orders to idle bots.
//!
//! `DispatchState` owns the order registry and the bot pool together so that
//! every transition touching both (bind, complete, requeue on bot removal)
//! happens in one place. It is plain synchronous state with no timers and
//! no locking; the controller wraps it in a mutex and arms completion timers
//! for the assignments it reports.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bots::{Bot, BotId, BotPool, BotStatus};
use crate::config::DispatchMode;
use crate::error::DispatchError;
use crate::orders::{OrderId, OrderRegistry, OrderStatus};

/// One (bot, order) binding made by the scheduler. Also the key of the
/// completion timer armed for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub bot: BotId,
    pub order: OrderId,
}

/// A bot taken out of the pool, and the order it gave back, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedBot {
    /// The bot as it was at removal time.
    pub bot: Bot,
    /// Order reverted to pending because the bot was holding it.
    pub requeued: Option<OrderId>,
}

/// Orders and bots, plus the transitions that keep them consistent.
#[derive(Debug, Default)]
pub struct DispatchState {
    pub orders: OrderRegistry,
    pub bots: BotPool,
}

impl DispatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One scheduler evaluation: at most one assignment.
    ///
    /// Picks the earliest pending VIP order (else the earliest pending
    /// Normal order) and the first idle bot in pool order. Does nothing when
    /// either is missing.
    pub fn step(&mut self) -> Option<Assignment> {
        let Some(bot) = self.bots.find_idle() else {
            debug!("Dispatch deferred: no idle bot");
            return None;
        };
        let Some(order) = self.orders.next_pending() else {
            debug!("Dispatch deferred: no pending order");
            return None;
        };

        if let Err(e) = self.bots.assign(bot, order) {
            warn!(bot_id = %bot, order_id = %order, error = %e, "Failed to bind bot");
            return None;
        }
        if let Err(e) = self.orders.set_status(order, OrderStatus::Processing) {
            warn!(bot_id = %bot, order_id = %order, error = %e, "Failed to bind order");
            self.bots.release(bot, order);
            return None;
        }

        info!(bot_id = %bot, order_id = %order, "Order dispatched");
        Some(Assignment { bot, order })
    }

    /// Run the scheduler for one trigger according to `mode`.
    pub fn dispatch(&mut self, mode: DispatchMode) -> Vec<Assignment> {
        match mode {
            DispatchMode::Single => self.step().into_iter().collect(),
            DispatchMode::Drain => std::iter::from_fn(|| self.step()).collect(),
        }
    }

    /// Finish an assignment: bot back to idle, order completed.
    ///
    /// Returns false without touching anything if the bot no longer holds
    /// the order (it was removed, or the order was requeued elsewhere).
    pub fn complete(&mut self, assignment: Assignment) -> bool {
        let Assignment { bot, order } = assignment;
        if !self.bots.release(bot, order) {
            debug!(bot_id = %bot, order_id = %order, "Ignoring stale completion");
            return false;
        }
        if let Err(e) = self.orders.set_status(order, OrderStatus::Completed) {
            warn!(bot_id = %bot, order_id = %order, error = %e, "Completed bot held unknown order");
        }
        info!(bot_id = %bot, order_id = %order, "Order completed");
        true
    }

    /// Remove the newest bot. A busy bot's order goes back to pending.
    pub fn remove_bot(&mut self) -> Option<RemovedBot> {
        let bot = self.bots.remove()?;

        let requeued = bot.order.and_then(|order| {
            match self.orders.set_status(order, OrderStatus::Pending) {
                Ok(_) => {
                    info!(bot_id = %bot.id, order_id = %order, "Order returned to queue");
                    Some(order)
                }
                Err(e) => {
                    warn!(bot_id = %bot.id, order_id = %order, error = %e, "Removed bot held unknown order");
                    None
                }
            }
        });

        Some(RemovedBot { bot, requeued })
    }

    /// Check the binding invariants between bots and orders.
    pub fn verify(&self) -> Result<(), DispatchError> {
        let mut holders: HashMap<OrderId, BotId> = HashMap::new();

        for bot in self.bots.all() {
            match (bot.status, bot.order) {
                (BotStatus::Busy, Some(order)) => {
                    if let Some(other) = holders.insert(order, bot.id) {
                        return Err(DispatchError::InvariantViolation(format!(
                            "order {order} held by bots {other} and {}",
                            bot.id
                        )));
                    }
                    let status = self
                        .orders
                        .get(order)
                        .map(|o| o.status)
                        .ok_or(DispatchError::OrderNotFound { id: order })?;
                    if status != OrderStatus::Processing {
                        return Err(DispatchError::InvariantViolation(format!(
                            "bot {} holds order {order} which is {status}",
                            bot.id
                        )));
                    }
                }
                (BotStatus::Idle, None) => {}
                (status, order) => {
                    return Err(DispatchError::InvariantViolation(format!(
                        "bot {} is {status} with order {order:?}",
                        bot.id
                    )));
                }
            }
        }

        for order in self.orders.all() {
            if order.status == OrderStatus::Processing && !holders.contains_key(&order.id) {
                return Err(DispatchError::InvariantViolation(format!(
                    "order {} is processing without a bot",
                    order.id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::OrderPriority;

    fn state_with(bots: usize, priorities: &[OrderPriority]) -> DispatchState {
        let mut state = DispatchState::new();
        for _ in 0..bots {
            state.bots.add();
        }
        for &priority in priorities {
            state.orders.create(priority);
        }
        state
    }

    fn dispatched_order_ids(state: &mut DispatchState) -> Vec<u64> {
        let mut ids = Vec::new();
        while let Some(assignment) = state.step() {
            ids.push(assignment.order.get());
            assert!(state.complete(assignment));
        }
        ids
    }

    #[test]
    fn step_binds_first_idle_bot_to_vip_order() {
        use OrderPriority::*;
        let mut state = state_with(2, &[Normal, Vip, Normal]);

        let assignment = state.step().unwrap();
        assert_eq!(assignment.bot, BotId::new(1));
        assert_eq!(assignment.order, OrderId::new(2));

        let bot = state.bots.get(BotId::new(1)).unwrap();
        assert_eq!(bot.status, BotStatus::Busy);
        assert_eq!(bot.order, Some(OrderId::new(2)));
        assert_eq!(
            state.orders.get(OrderId::new(2)).unwrap().status,
            OrderStatus::Processing
        );
        state.verify().unwrap();
    }

    #[test]
    fn vip_orders_always_go_first() {
        use OrderPriority::*;
        let mut state = state_with(1, &[Normal, Normal, Vip, Normal, Vip]);
        assert_eq!(dispatched_order_ids(&mut state), vec![3, 5, 1, 2, 4]);
    }

    #[test]
    fn fifo_within_priority_class() {
        let mut state = state_with(1, &[OrderPriority::Normal; 4]);
        assert_eq!(dispatched_order_ids(&mut state), vec![1, 2, 3, 4]);
    }

    #[test]
    fn step_without_idle_bot_changes_nothing() {
        let mut state = state_with(0, &[OrderPriority::Vip]);
        assert!(state.step().is_none());
        assert_eq!(state.orders.list_by_status(OrderStatus::Pending).len(), 1);

        state.bots.add();
        state.step().unwrap();
        state.orders.create(OrderPriority::Normal);
        assert!(state.step().is_none());
        assert_eq!(state.orders.list_by_status(OrderStatus::Pending).len(), 1);
        state.verify().unwrap();
    }

    #[test]
    fn step_without_pending_order_changes_nothing() {
        let mut state = state_with(2, &[]);
        assert!(state.step().is_none());
        assert_eq!(state.bots.idle_count(), 2);
    }

    #[test]
    fn single_mode_makes_one_assignment() {
        let mut state = state_with(3, &[OrderPriority::Normal; 3]);
        let assignments = state.dispatch(DispatchMode::Single);
        assert_eq!(assignments.len(), 1);
        assert_eq!(state.bots.idle_count(), 2);
    }

    #[test]
    fn drain_mode_fills_every_idle_bot() {
        use OrderPriority::*;
        let mut state = state_with(3, &[Normal, Normal, Vip, Normal, Normal]);
        let assignments = state.dispatch(DispatchMode::Drain);

        let pairs: Vec<(u64, u64)> = assignments
            .iter()
            .map(|a| (a.bot.get(), a.order.get()))
            .collect();
        assert_eq!(pairs, vec![(1, 3), (2, 1), (3, 2)]);
        assert_eq!(state.bots.idle_count(), 0);
        assert_eq!(state.orders.list_by_status(OrderStatus::Pending).len(), 2);
        state.verify().unwrap();
    }

    #[test]
    fn each_order_held_by_one_bot() {
        let mut state = state_with(4, &[OrderPriority::Normal; 2]);
        let assignments = state.dispatch(DispatchMode::Drain);
        assert_eq!(assignments.len(), 2);
        assert_ne!(assignments[0].order, assignments[1].order);
        assert_eq!(state.bots.idle_count(), 2);
        state.verify().unwrap();
    }

    #[test]
    fn complete_releases_bot_and_finishes_order() {
        let mut state = state_with(1, &[OrderPriority::Normal]);
        let assignment = state.step().unwrap();

        assert!(state.complete(assignment));
        assert!(state.bots.get(assignment.bot).unwrap().is_idle());
        assert_eq!(
            state.orders.get(assignment.order).unwrap().status,
            OrderStatus::Completed
        );
        assert!(!state.complete(assignment));
        state.verify().unwrap();
    }

    #[test]
    fn removing_busy_bot_requeues_its_order() {
        let mut state = state_with(1, &[OrderPriority::Normal]);
        let assignment = state.step().unwrap();

        let removed = state.remove_bot().unwrap();
        assert_eq!(removed.bot.id, assignment.bot);
        assert_eq!(removed.requeued, Some(assignment.order));
        assert_eq!(
            state.orders.get(assignment.order).unwrap().status,
            OrderStatus::Pending
        );
        assert!(state.bots.is_empty());
        assert!(state.step().is_none());
        state.verify().unwrap();
    }

    #[test]
    fn stale_completion_after_removal_is_ignored() {
        let mut state = state_with(1, &[OrderPriority::Normal]);
        let assignment = state.step().unwrap();
        state.remove_bot().unwrap();

        assert!(!state.complete(assignment));
        assert_eq!(
            state.orders.get(assignment.order).unwrap().status,
            OrderStatus::Pending
        );
        state.verify().unwrap();
    }

    #[test]
    fn completion_for_a_different_order_is_ignored() {
        let mut state = state_with(1, &[OrderPriority::Normal, OrderPriority::Normal]);
        let assignment = state.step().unwrap();

        let wrong = Assignment {
            bot: assignment.bot,
            order: OrderId::new(2),
        };
        assert!(!state.complete(wrong));
        assert!(state.bots.get(assignment.bot).unwrap().holds(assignment.order));
        assert_eq!(
            state.orders.get(OrderId::new(2)).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn removing_idle_bot_requeues_nothing() {
        let mut state = state_with(2, &[OrderPriority::Normal]);
        state.step().unwrap();
        let removed = state.remove_bot().unwrap();
        assert_eq!(removed.bot.id, BotId::new(2));
        assert_eq!(removed.requeued, None);
        assert!(state.remove_bot().unwrap().requeued.is_some());
        assert!(state.remove_bot().is_none());
    }

    #[test]
    fn verify_catches_unbound_processing_order() {
        let mut state = state_with(1, &[OrderPriority::Normal]);
        state
            .orders
            .set_status(OrderId::new(1), OrderStatus::Processing)
            .unwrap();
        assert!(matches!(
            state.verify(),
            Err(DispatchError::InvariantViolation(_))
        ));
    }

    #[test]
    fn verify_catches_busy_bot_on_completed_order() {
        let mut state = state_with(1, &[OrderPriority::Normal]);
        let assignment = state.step().unwrap();
        state
            .orders
            .set_status(assignment.order, OrderStatus::Completed)
            .unwrap();
        assert!(state.verify().is_err());
    }
}
