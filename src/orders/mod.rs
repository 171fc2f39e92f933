//! Orders — data model and the registry that owns every order ever created.

pub mod model;
pub mod registry;

pub use model::{Order, OrderId, OrderPriority, OrderStatus};
pub use registry::OrderRegistry;
