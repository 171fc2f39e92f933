//! Controller events, broadcast to whoever renders the queue.

use serde::{Deserialize, Serialize};

use crate::bots::BotId;
use crate::orders::{Order, OrderId};

/// State changes published by the controller, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// A new order entered the queue.
    OrderCreated { order: Order },
    /// An order was bound to a bot.
    OrderDispatched { order: OrderId, bot: BotId },
    /// A bot finished its order.
    OrderCompleted { order: OrderId, bot: BotId },
    /// A removed bot's order went back to pending.
    OrderRequeued { order: OrderId, bot: BotId },
    BotAdded { bot: BotId },
    BotRemoved { bot: BotId },
}

impl std::fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderCreated { order } => write!(f, "New {} order No.{}", order.priority, order.id),
            Self::OrderDispatched { order, bot } => {
                write!(f, "Bot {} picked up Order No.{}", bot, order)
            }
            Self::OrderCompleted { order, bot } => {
                write!(f, "Bot {} completed Order No.{}", bot, order)
            }
            Self::OrderRequeued { order, bot } => {
                write!(f, "Order No.{} returned to queue from Bot {}", order, bot)
            }
            Self::BotAdded { bot } => write!(f, "Bot {} added", bot),
            Self::BotRemoved { bot } => write!(f, "Bot {} removed", bot),
        }
    }
}
