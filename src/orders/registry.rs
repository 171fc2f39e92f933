//! Order registry. Every order in creation order, never destroyed.

use chrono::Utc;
use tracing::{debug, warn};

use super::model::{Order, OrderId, OrderPriority, OrderStatus};
use crate::error::DispatchError;

/// Owns all orders. Insertion order is creation order, which is what the
/// FIFO tie-break relies on.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: Vec<Order>,
    last_id: u64,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new pending order with the next sequential id.
    pub fn create(&mut self, priority: OrderPriority) -> Order {
        self.last_id += 1;
        let order = Order::new(OrderId::new(self.last_id), priority);
        debug!(order_id = %order.id, priority = %priority, "Order registered");
        self.orders.push(order.clone());
        order
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Overwrite an order's status. Returns the previous status.
    ///
    /// Transition legality is not checked here.
    pub fn set_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, DispatchError> {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == id) else {
            warn!(order_id = %id, status = %status, "Cannot set status of unknown order");
            return Err(DispatchError::OrderNotFound { id });
        };

        let previous = order.status;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(previous)
    }

    /// All orders with the given status, in creation order.
    pub fn list_by_status(&self, status: OrderStatus) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect()
    }

    /// The order the scheduler should pick next: the earliest pending VIP
    /// order, or failing that the earliest pending Normal order.
    pub fn next_pending(&self) -> Option<OrderId> {
        let mut first_normal = None;
        for order in self.orders.iter().filter(|o| o.status == OrderStatus::Pending) {
            if order.is_vip() {
                return Some(order.id);
            }
            if first_normal.is_none() {
                first_normal = Some(order.id);
            }
        }
        first_normal
    }

    pub fn has_pending(&self) -> bool {
        self.orders.iter().any(|o| o.status == OrderStatus::Pending)
    }

    /// Every order, in creation order.
    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
