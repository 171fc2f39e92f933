//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How many assignments a single scheduler evaluation may make.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Keep assigning until no idle bot or no pending order is left.
    #[default]
    Drain,
    /// At most one assignment per trigger (legacy behavior).
    Single,
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drain => write!(f, "drain"),
            Self::Single => write!(f, "single"),
        }
    }
}

impl std::str::FromStr for DispatchMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drain" => Ok(Self::Drain),
            "single" => Ok(Self::Single),
            _ => Err(format!("Unknown dispatch mode: {}", s)),
        }
    }
}

/// Order controller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How long a bot spends on one order.
    pub processing_time: Duration,
    /// Assignments per scheduler evaluation.
    pub dispatch_mode: DispatchMode,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            processing_time: Duration::from_secs(10),
            dispatch_mode: DispatchMode::Drain,
            event_capacity: 256,
        }
    }
}

impl ControllerConfig {
    /// Build config from environment variables, falling back to defaults
    /// for anything unset.
    ///
    /// - `ORDER_PROCESSING_MS`: processing time in milliseconds
    /// - `ORDER_DISPATCH_MODE`: `drain` or `single`
    /// - `ORDER_EVENT_CAPACITY`: event channel capacity (> 0)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("ORDER_PROCESSING_MS") {
            let ms: u64 = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "ORDER_PROCESSING_MS".to_string(),
                message: format!("{e}"),
            })?;
            config.processing_time = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("ORDER_DISPATCH_MODE") {
            config.dispatch_mode = raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "ORDER_DISPATCH_MODE".to_string(),
                message,
            })?;
        }

        if let Some(raw) = lookup("ORDER_EVENT_CAPACITY") {
            let capacity: usize = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "ORDER_EVENT_CAPACITY".to_string(),
                message: format!("{e}"),
            })?;
            if capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "ORDER_EVENT_CAPACITY".to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            config.event_capacity = capacity;
        }

        Ok(config)
    }
}
