//! Error types for the order controller.

use crate::bots::BotId;
use crate::orders::OrderId;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by the registry, the pool and the dispatch state.
///
/// None of these are fatal: the operation that produced one left the state
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Order {id} not found")]
    OrderNotFound { id: OrderId },

    #[error("Bot {id} not found")]
    BotNotFound { id: BotId },

    #[error("Bot {id} is busy with order {order}")]
    BotBusy { id: BotId, order: OrderId },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_error_messages() {
        let err = DispatchError::OrderNotFound { id: OrderId::new(7) };
        assert_eq!(err.to_string(), "Order 7 not found");

        let err = DispatchError::BotBusy {
            id: BotId::new(2),
            order: OrderId::new(3),
        };
        assert_eq!(err.to_string(), "Bot 2 is busy with order 3");
    }

    #[test]
    fn config_error_wraps_into_top_level() {
        let err: Error = ConfigError::InvalidValue {
            key: "ORDER_DISPATCH_MODE".into(),
            message: "unknown mode".into(),
        }
        .into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("ORDER_DISPATCH_MODE"));
    }
}
