//! Bot data model.

use serde::{Deserialize, Serialize};

use crate::orders::OrderId;

/// Bot number, derived from its position in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BotId(u64);

impl BotId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BotId> for String {
    fn from(id: BotId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for BotId {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid bot id '{}': {}", value, e))
    }
}

/// Bot lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotStatus {
    Idle,
    Busy,
}

impl std::fmt::Display for BotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Busy => write!(f, "BUSY"),
        }
    }
}

/// A cooking bot. Holds at most one order, and holds one exactly when busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    pub status: BotStatus,
    /// The order this bot is working on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderId>,
}

impl Bot {
    pub fn new(id: BotId) -> Self {
        Self {
            id,
            status: BotStatus::Idle,
            order: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == BotStatus::Idle
    }

    /// Whether this bot is currently bound to `order`.
    pub fn holds(&self, order: OrderId) -> bool {
        self.status == BotStatus::Busy && self.order == Some(order)
    }
}

impl std::fmt::Display for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bot {} - {}", self.id, self.status)?;
        if let Some(order) = self.order {
            write!(f, " - Processing: Order No.{}", order)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bot_is_idle() {
        let bot = Bot::new(BotId::new(1));
        assert!(bot.is_idle());
        assert_eq!(bot.order, None);
        assert!(!bot.holds(OrderId::new(1)));
    }

    #[test]
    fn display_matches_bots_area_format() {
        let mut bot = Bot::new(BotId::new(2));
        assert_eq!(bot.to_string(), "Bot 2 - IDLE");
        bot.status = BotStatus::Busy;
        bot.order = Some(OrderId::new(5));
        assert_eq!(bot.to_string(), "Bot 2 - BUSY - Processing: Order No.5");
    }

    #[test]
    fn idle_bot_serializes_without_order() {
        let json = serde_json::to_value(Bot::new(BotId::new(1))).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["status"], "idle");
        assert!(json.get("order").is_none());
    }
}
