//! Order data model — ids, priority classes, lifecycle statuses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequential order number. Serialized in string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OrderId(u64);

impl OrderId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid order id '{}': {}", s, e))
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for OrderId {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Priority class of an order. VIP orders always dispatch first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    Normal,
    Vip,
}

impl std::fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Vip => write!(f, "VIP"),
        }
    }
}

impl std::str::FromStr for OrderPriority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "vip" => Ok(Self::Vip),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting for an idle bot.
    Pending,
    /// Bound to exactly one bot.
    Processing,
    /// Finished. Terminal.
    Completed,
}

impl OrderStatus {
    /// Whether the order still shows up in the pending area.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
        };
        write!(f, "{s}")
    }
}

/// A single order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Sequential order number.
    pub id: OrderId,
    /// Priority class.
    pub priority: OrderPriority,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new pending order.
    pub fn new(id: OrderId, priority: OrderPriority) -> Self {
        let now = Utc::now();
        Self {
            id,
            priority,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_vip(&self) -> bool {
        self.priority == OrderPriority::Vip
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Order No.{} - {} - {}", self.id, self.priority, self.status)
    }
}
