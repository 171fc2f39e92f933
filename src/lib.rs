//! Order dispatch — a priority order queue served by a resizable pool of bots.

pub mod bots;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod orders;

pub use bots::{Bot, BotId, BotStatus};
pub use config::{ControllerConfig, DispatchMode};
pub use dispatch::{ControllerEvent, ControllerSnapshot, OrderController};
pub use error::{ConfigError, DispatchError, Error};
pub use orders::{Order, OrderId, OrderPriority, OrderStatus};
