//! Bots and the pool that holds them.

pub mod model;
pub mod pool;

pub use model::{Bot, BotId, BotStatus};
pub use pool::BotPool;
