//! Slash commands recognized outside the step-by-step flow.

use std::fmt;

/// Preset amounts, in whole currency units, offered for test payments.
pub const DEV_TEST_AMOUNTS: [u32; 3] = [100, 500, 1000];

/// A command the customer typed, e.g. `/order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Order,
    Help,
    Prices,
    Cancel,
    /// Confirms the current order without payment. Developer mode only.
    DevSkip,
    /// Issues a synthetic test invoice. Developer mode only.
    DevPayTest { amount: Option<u32> },
}

impl BotCommand {
    /// Parses `/name`, `/name@bot` or `/name argument`. Returns `None` for
    /// anything that is not a known command.
    pub fn parse(text: &str) -> Option<BotCommand> {
        let rest = text.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let head = parts.next()?;
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

        let command = match name.as_str() {
            "start" => BotCommand::Start,
            "order" => BotCommand::Order,
            "help" => BotCommand::Help,
            "prices" => BotCommand::Prices,
            "cancel" => BotCommand::Cancel,
            "dev_skip" => BotCommand::DevSkip,
            "dev_paytest" => BotCommand::DevPayTest {
                amount: parts.next().and_then(|a| a.parse().ok()),
            },
            _ => return None,
        };
        Some(command)
    }

    /// Command name without the leading slash.
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Start => "start",
            BotCommand::Order => "order",
            BotCommand::Help => "help",
            BotCommand::Prices => "prices",
            BotCommand::Cancel => "cancel",
            BotCommand::DevSkip => "dev_skip",
            BotCommand::DevPayTest { .. } => "dev_paytest",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BotCommand::Start => "start the bot",
            BotCommand::Order => "place an order",
            BotCommand::Help => "show help",
            BotCommand::Prices => "show prices",
            BotCommand::Cancel => "cancel the current order",
            BotCommand::DevSkip => "skip payment (developer mode)",
            BotCommand::DevPayTest { .. } => "send a test invoice (developer mode)",
        }
    }

    /// Returns true for debug-only commands.
    pub fn is_developer_only(&self) -> bool {
        matches!(self, BotCommand::DevSkip | BotCommand::DevPayTest { .. })
    }

    /// Commands to advertise to the customer.
    pub fn menu(developer_mode: bool) -> Vec<BotCommand> {
        [
            BotCommand::Start,
            BotCommand::Order,
            BotCommand::Help,
            BotCommand::Prices,
            BotCommand::Cancel,
            BotCommand::DevSkip,
            BotCommand::DevPayTest { amount: None },
        ]
        .into_iter()
        .filter(|c| developer_mode || !c.is_developer_only())
        .collect()
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse(" /ORDER "), Some(BotCommand::Order));
        assert_eq!(BotCommand::parse("/help@cake_bot"), Some(BotCommand::Help));
        assert_eq!(BotCommand::parse("/cancel"), Some(BotCommand::Cancel));
        assert_eq!(BotCommand::parse("/dev_skip"), Some(BotCommand::DevSkip));
    }

    #[test]
    fn test_parse_paytest_amount() {
        assert_eq!(
            BotCommand::parse("/dev_paytest 500"),
            Some(BotCommand::DevPayTest { amount: Some(500) })
        );
        assert_eq!(
            BotCommand::parse("/dev_paytest"),
            Some(BotCommand::DevPayTest { amount: None })
        );
        assert_eq!(
            BotCommand::parse("/dev_paytest lots"),
            Some(BotCommand::DevPayTest { amount: None })
        );
    }

    #[test]
    fn test_non_commands() {
        assert_eq!(BotCommand::parse("order"), None);
        assert_eq!(BotCommand::parse("/unknown"), None);
        assert_eq!(BotCommand::parse("/"), None);
        assert_eq!(BotCommand::parse("Cancel order"), None);
    }

    #[test]
    fn test_menu_hides_dev_commands() {
        assert!(BotCommand::menu(false).iter().all(|c| !c.is_developer_only()));
        assert_eq!(BotCommand::menu(true).len(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(BotCommand::DevPayTest { amount: Some(1) }.to_string(), "/dev_paytest");
    }
}
