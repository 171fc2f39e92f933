//! Bot pool. Grows at the back, shrinks from the back.

use tracing::debug;

use super::model::{Bot, BotId, BotStatus};
use crate::error::DispatchError;
use crate::orders::OrderId;

/// Holds every live bot in pool order.
///
/// Ids are `len + 1` at the time of the add. Since removal always takes the
/// newest bot, a live id is never handed out twice.
#[derive(Debug, Default)]
pub struct BotPool {
    bots: Vec<Bot>,
}

impl BotPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an idle bot at the end of the pool.
    pub fn add(&mut self) -> Bot {
        let bot = Bot::new(BotId::new(self.bots.len() as u64 + 1));
        self.bots.push(bot.clone());
        debug!(bot_id = %bot.id, pool_size = self.bots.len(), "Bot added to pool");
        bot
    }

    /// Remove the most recently added bot.
    ///
    /// The returned bot may still hold an order; putting that order back in
    /// the queue is the caller's job.
    pub fn remove(&mut self) -> Option<Bot> {
        let bot = self.bots.pop()?;
        debug!(bot_id = %bot.id, pool_size = self.bots.len(), "Bot removed from pool");
        Some(bot)
    }

    /// First idle bot in pool order.
    pub fn find_idle(&self) -> Option<BotId> {
        self.bots.iter().find(|b| b.is_idle()).map(|b| b.id)
    }

    /// Bind an idle bot to an order.
    pub fn assign(&mut self, id: BotId, order: OrderId) -> Result<(), DispatchError> {
        let bot = self
            .bots
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(DispatchError::BotNotFound { id })?;

        if let Some(current) = bot.order {
            return Err(DispatchError::BotBusy { id, order: current });
        }

        bot.status = BotStatus::Busy;
        bot.order = Some(order);
        Ok(())
    }

    /// Release a bot from `order`. Returns false, changing nothing, unless
    /// the bot exists and still holds exactly that order.
    pub fn release(&mut self, id: BotId, order: OrderId) -> bool {
        match self.bots.iter_mut().find(|b| b.id == id) {
            Some(bot) if bot.holds(order) => {
                bot.status = BotStatus::Idle;
                bot.order = None;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: BotId) -> Option<&Bot> {
        self.bots.iter().find(|b| b.id == id)
    }

    /// Every bot, in pool order.
    pub fn all(&self) -> &[Bot] {
        &self.bots
    }

    pub fn idle_count(&self) -> usize {
        self.bots.iter().filter(|b| b.is_idle()).count()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}
