//! Order controller — the command/query surface over the dispatch state.
//!
//! Every command takes the state lock, mutates, runs the scheduler and arms
//! completion timers before releasing it, so no caller can observe a state
//! where dispatch should have happened but has not. Timer fires go through
//! the same lock.

use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use super::events::ControllerEvent;
use super::scheduler::{Assignment, DispatchState};
use super::snapshot::ControllerSnapshot;
use super::timer::CompletionTimers;
use crate::bots::{Bot, BotId};
use crate::config::ControllerConfig;
use crate::error::DispatchError;
use crate::orders::{Order, OrderId, OrderPriority};

struct ControllerState {
    dispatch: DispatchState,
    timers: CompletionTimers,
}

struct Inner {
    config: ControllerConfig,
    state: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

/// Cloneable handle to one order queue and its bot pool.
#[derive(Clone)]
pub struct OrderController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for OrderController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderController")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl OrderController {
    /// Create a controller with no orders and no bots.
    pub fn new(config: ControllerConfig) -> Self {
        let (events, _rx) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(ControllerState {
                    dispatch: DispatchState::new(),
                    timers: CompletionTimers::new(),
                }),
                events,
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Subscribe to state-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.inner.events.subscribe()
    }

    /// Place a new order. Returns it as it stands after dispatch ran.
    pub async fn create_order(&self, priority: OrderPriority) -> Order {
        let mut state = self.inner.state.lock().await;
        let order = state.dispatch.orders.create(priority);
        info!(order_id = %order.id, priority = %priority, "New order");
        self.inner.emit(ControllerEvent::OrderCreated {
            order: order.clone(),
        });

        self.inner.run_dispatch(&mut state);
        state.dispatch.orders.get(order.id).cloned().unwrap_or(order)
    }

    /// Grow the pool by one bot. Returns it as it stands after dispatch ran.
    pub async fn add_bot(&self) -> Bot {
        let mut state = self.inner.state.lock().await;
        let bot = state.dispatch.bots.add();
        info!(bot_id = %bot.id, pool_size = state.dispatch.bots.len(), "Bot added");
        self.inner.emit(ControllerEvent::BotAdded { bot: bot.id });

        self.inner.run_dispatch(&mut state);
        state.dispatch.bots.get(bot.id).cloned().unwrap_or(bot)
    }

    /// Shrink the pool by its newest bot.
    ///
    /// If that bot was busy, its completion timer is cancelled and its
    /// order goes back to pending. Returns the bot as it was when removed,
    /// or `None` if the pool was empty.
    pub async fn remove_bot(&self) -> Option<Bot> {
        let mut state = self.inner.state.lock().await;
        let Some(removed) = state.dispatch.remove_bot() else {
            debug!("No bot to remove");
            return None;
        };

        if let Some(order) = removed.bot.order {
            state.timers.cancel(&Assignment {
                bot: removed.bot.id,
                order,
            });
        }
        info!(bot_id = %removed.bot.id, pool_size = state.dispatch.bots.len(), "Bot removed");
        self.inner.emit(ControllerEvent::BotRemoved {
            bot: removed.bot.id,
        });
        if let Some(order) = removed.requeued {
            self.inner.emit(ControllerEvent::OrderRequeued {
                order,
                bot: removed.bot.id,
            });
        }

        self.inner.run_dispatch(&mut state);
        Some(removed.bot)
    }

    /// Run one scheduler evaluation outside of any command.
    pub async fn dispatch_now(&self) -> Vec<Assignment> {
        let mut state = self.inner.state.lock().await;
        self.inner.run_dispatch(&mut state)
    }

    /// Every order, in creation order.
    pub async fn all_orders(&self) -> Vec<Order> {
        self.inner.state.lock().await.dispatch.orders.all().to_vec()
    }

    /// Every bot, in pool order.
    pub async fn all_bots(&self) -> Vec<Bot> {
        self.inner.state.lock().await.dispatch.bots.all().to_vec()
    }

    pub async fn order(&self, id: OrderId) -> Result<Order, DispatchError> {
        let state = self.inner.state.lock().await;
        state
            .dispatch
            .orders
            .get(id)
            .cloned()
            .ok_or(DispatchError::OrderNotFound { id })
    }

    pub async fn bot(&self, id: BotId) -> Result<Bot, DispatchError> {
        let state = self.inner.state.lock().await;
        state
            .dispatch
            .bots
            .get(id)
            .cloned()
            .ok_or(DispatchError::BotNotFound { id })
    }

    /// Pending/processing, completed and bot views, taken atomically.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        let state = self.inner.state.lock().await;
        ControllerSnapshot::capture(&state.dispatch)
    }

    /// Number of completion timers still armed.
    pub async fn pending_timers(&self) -> usize {
        self.inner.state.lock().await.timers.len()
    }

    /// Check the bot/order binding invariants, including that every busy
    /// bot has exactly one armed timer.
    pub async fn verify(&self) -> Result<(), DispatchError> {
        let state = self.inner.state.lock().await;
        state.dispatch.verify()?;

        let busy: Vec<Assignment> = state
            .dispatch
            .bots
            .all()
            .iter()
            .filter_map(|b| b.order.map(|order| Assignment { bot: b.id, order }))
            .collect();
        if busy.len() != state.timers.len() {
            return Err(DispatchError::InvariantViolation(format!(
                "{} busy bots but {} armed timers",
                busy.len(),
                state.timers.len()
            )));
        }
        if let Some(missing) = busy.iter().find(|a| !state.timers.is_armed(a)) {
            return Err(DispatchError::InvariantViolation(format!(
                "bot {} has no completion timer for order {}",
                missing.bot, missing.order
            )));
        }
        Ok(())
    }

    /// Cancel every outstanding completion timer. Orders in flight stay
    /// processing. Returns the number of timers cancelled.
    pub async fn shutdown(&self) -> usize {
        let cancelled = self.inner.state.lock().await.timers.cancel_all();
        info!(cancelled, "Order controller shut down");
        cancelled
    }
}

impl Inner {
    fn emit(&self, event: ControllerEvent) {
        // Ok if nobody is listening.
        let _ = self.events.send(event);
    }

    /// Run the scheduler once for the current trigger and arm a completion
    /// timer for each assignment it makes.
    fn run_dispatch(self: &Arc<Self>, state: &mut ControllerState) -> Vec<Assignment> {
        let assignments = state.dispatch.dispatch(self.config.dispatch_mode);

        for &assignment in &assignments {
            let weak: Weak<Inner> = Arc::downgrade(self);
            state
                .timers
                .arm(assignment, self.config.processing_time, async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.complete(assignment).await;
                    }
                });
            self.emit(ControllerEvent::OrderDispatched {
                order: assignment.order,
                bot: assignment.bot,
            });
        }

        assignments
    }

    /// Completion timer fired for `assignment`.
    async fn complete(self: Arc<Self>, assignment: Assignment) {
        let mut state = self.state.lock().await;
        state.timers.disarm(&assignment);

        if !state.dispatch.complete(assignment) {
            return;
        }
        self.emit(ControllerEvent::OrderCompleted {
            order: assignment.order,
            bot: assignment.bot,
        });

        self.run_dispatch(&mut state);
    }
}
