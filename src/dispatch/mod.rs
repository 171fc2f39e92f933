//! Dispatch — the scheduler, its completion timers, and the controller that
//! ties them to the order registry and the bot pool.
//!
//! - `scheduler` — `DispatchState`: bind / complete / requeue transitions
//! - `timer` — `CompletionTimers`: cancellable one-shot delays keyed by assignment
//! - `controller` — `OrderController`: commands, queries, trigger chain
//! - `events` — `ControllerEvent` broadcast stream
//! - `snapshot` — display views of the three areas

pub mod controller;
pub mod events;
pub mod scheduler;
pub mod snapshot;
pub mod timer;

pub use controller::OrderController;
pub use events::ControllerEvent;
pub use scheduler::{Assignment, DispatchState, RemovedBot};
pub use snapshot::ControllerSnapshot;
pub use timer::CompletionTimers;
