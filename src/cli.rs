//! CLI front-end — line commands mapped onto controller calls.

use crate::dispatch::OrderController;
use crate::orders::OrderPriority;

pub const HELP: &str = "\
Commands:
  normal | n        place a normal order
  vip | v           place a VIP order
  +bot | add | +    add a bot
  -bot | remove | - remove the newest bot
  status | s        show pending, bots and completed areas
  status --json     same, as JSON
  help | ?          show this help
  quit | exit | q   leave";

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NewOrder(OrderPriority),
    AddBot,
    RemoveBot,
    Status { json: bool },
    Help,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let head = words.next().unwrap_or_default().to_ascii_lowercase();
        let rest: Vec<&str> = words.collect();

        let command = match head.as_str() {
            "normal" | "n" => Self::NewOrder(OrderPriority::Normal),
            "vip" | "v" => Self::NewOrder(OrderPriority::Vip),
            "+bot" | "add" | "+" => Self::AddBot,
            "-bot" | "remove" | "-" => Self::RemoveBot,
            "status" | "s" => {
                return match rest.as_slice() {
                    [] => Ok(Self::Status { json: false }),
                    ["--json"] => Ok(Self::Status { json: true }),
                    _ => Err(format!("Unexpected arguments: {}", rest.join(" "))),
                };
            }
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            "" => return Err("Empty command".to_string()),
            other => return Err(format!("Unknown command: {other}")),
        };

        if !rest.is_empty() {
            return Err(format!("Unexpected arguments: {}", rest.join(" ")));
        }
        Ok(command)
    }
}

/// Run a command. Returns the text to print, if any.
pub async fn execute(
    controller: &OrderController,
    command: Command,
) -> crate::error::Result<Option<String>> {
    let output = match command {
        Command::NewOrder(priority) => {
            let order = controller.create_order(priority).await;
            Some(order.to_string())
        }
        Command::AddBot => Some(controller.add_bot().await.to_string()),
        Command::RemoveBot => match controller.remove_bot().await {
            Some(bot) => Some(format!("Bot {} removed", bot.id)),
            None => Some("No bots to remove".to_string()),
        },
        Command::Status { json: false } => Some(controller.snapshot().await.to_string()),
        Command::Status { json: true } => {
            Some(serde_json::to_string_pretty(&controller.snapshot().await)?)
        }
        Command::Help => Some(HELP.to_string()),
        Command::Quit => None,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;

    #[test]
    fn parses_aliases() {
        assert_eq!("vip".parse::<Command>(), Ok(Command::NewOrder(OrderPriority::Vip)));
        assert_eq!("N".parse::<Command>(), Ok(Command::NewOrder(OrderPriority::Normal)));
        assert_eq!("+bot".parse::<Command>(), Ok(Command::AddBot));
        assert_eq!(" - ".parse::<Command>(), Ok(Command::RemoveBot));
        assert_eq!("status".parse::<Command>(), Ok(Command::Status { json: false }));
        assert_eq!("s --json".parse::<Command>(), Ok(Command::Status { json: true }));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().unwrap_err().contains("Unknown command"));
        assert!("vip now".parse::<Command>().is_err());
        assert!("status --yaml".parse::<Command>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn execute_drives_controller() {
        let controller = OrderController::new(ControllerConfig::default());

        let out = execute(&controller, Command::NewOrder(OrderPriority::Vip))
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("Order No.1 - VIP - PENDING"));

        let out = execute(&controller, Command::AddBot).await.unwrap();
        assert_eq!(out.as_deref(), Some("Bot 1 - BUSY - Processing: Order No.1"));

        let out = execute(&controller, Command::Status { json: true })
            .await
            .unwrap()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["pending"][0]["status"], "processing");
        assert_eq!(json["bots"][0]["order"], "1");

        let out = execute(&controller, Command::RemoveBot).await.unwrap();
        assert_eq!(out.as_deref(), Some("Bot 1 removed"));
        let out = execute(&controller, Command::RemoveBot).await.unwrap();
        assert_eq!(out.as_deref(), Some("No bots to remove"));

        assert!(execute(&controller, Command::Quit).await.unwrap().is_none());
    }
}
