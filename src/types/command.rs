//! Name-addressed ledger commands
//!
//! Commands are what a command log (or any front end that only knows names)
//! submits to the ledger. They mirror the ledger operations but refer to
//! participants by name; ids are resolved when the command is applied.

use rust_decimal::Decimal;

/// Kind of a command, as spelled in the `op` column of a command log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    AddParticipant,
    RemoveParticipant,
    AddOrder,
    Clear,
}

impl CommandKind {
    /// Parse an `op` value, ignoring case and surrounding whitespace
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim().to_lowercase().as_str() {
            "add_participant" => Some(CommandKind::AddParticipant),
            "remove_participant" => Some(CommandKind::RemoveParticipant),
            "add_order" => Some(CommandKind::AddOrder),
            "clear" => Some(CommandKind::Clear),
            _ => None,
        }
    }
}

/// A single ledger command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Register a participant
    AddParticipant { name: String },

    /// Remove a participant by name, cascading to their orders
    RemoveParticipant { name: String },

    /// Record an order shared by the named participants
    AddOrder {
        drink_name: String,
        unit_price: Decimal,
        quantity: u32,
        memo: String,
        category: Option<String>,
        payers: Vec<String>,
    },

    /// Remove every participant and order
    Clear,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::AddParticipant { .. } => CommandKind::AddParticipant,
            Command::RemoveParticipant { .. } => CommandKind::RemoveParticipant,
            Command::AddOrder { .. } => CommandKind::AddOrder,
            Command::Clear => CommandKind::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("add_participant", Some(CommandKind::AddParticipant))]
    #[case("REMOVE_PARTICIPANT", Some(CommandKind::RemoveParticipant))]
    #[case("  Add_Order ", Some(CommandKind::AddOrder))]
    #[case("clear", Some(CommandKind::Clear))]
    #[case("deposit", None)]
    #[case("", None)]
    fn test_command_kind_parse(#[case] op: &str, #[case] expected: Option<CommandKind>) {
        assert_eq!(CommandKind::parse(op), expected);
    }
}
