//! Read-only views of the controller state for display.

use serde::{Deserialize, Serialize};

use super::scheduler::DispatchState;
use crate::bots::Bot;
use crate::orders::{Order, OrderStatus};

/// Everything a front-end needs to draw the three areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Pending and processing orders, VIP first, then creation order.
    pub pending: Vec<Order>,
    /// Completed orders in creation order.
    pub completed: Vec<Order>,
    /// Bots in pool order.
    pub bots: Vec<Bot>,
}

impl ControllerSnapshot {
    pub fn capture(state: &DispatchState) -> Self {
        let mut pending: Vec<Order> = state
            .orders
            .all()
            .iter()
            .filter(|o| o.status.is_open())
            .cloned()
            .collect();
        // Stable: creation order survives within each class.
        pending.sort_by_key(|o| !o.is_vip());

        Self {
            pending,
            completed: state.orders.list_by_status(OrderStatus::Completed),
            bots: state.bots.all().to_vec(),
        }
    }
}

impl std::fmt::Display for ControllerSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pending Area")?;
        for order in &self.pending {
            writeln!(f, "  {order}")?;
        }
        writeln!(f, "Bots Area")?;
        for bot in &self.bots {
            writeln!(f, "  {bot}")?;
        }
        writeln!(f, "Completed Area")?;
        for order in &self.completed {
            writeln!(f, "  {order}")?;
        }
        Ok(())
    }
}
