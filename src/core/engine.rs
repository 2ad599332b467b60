//! Command dispatch
//!
//! Applies name-addressed [`Command`]s to a [`Ledger`]. Front ends that only
//! know participant names (the command log, the CLI) go through here; names
//! are resolved to ids case-insensitively before the ledger operation runs.

use crate::core::ledger::{Ledger, Removal};
use crate::types::{Command, NewOrder, OrderId, OrderRejection, ParticipantId, SplitError};
use tracing::debug;

/// What a successfully applied command did
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    ParticipantAdded(ParticipantId),
    ParticipantRemoved(Removal),
    OrderAdded(OrderId),
    Cleared,
}

/// Apply a single command to the ledger
///
/// Routes the command to the matching ledger operation.
///
/// # Errors
///
/// Returns the ledger's validation error, or `InvalidOrder` with
/// `UnknownPayerName` if an order names a participant that does not exist.
/// Removing an unknown name succeeds as a no-op, like removing an unknown id.
pub fn apply(ledger: &mut Ledger, command: Command) -> Result<Applied, SplitError> {
    debug!(kind = ?command.kind(), "applying command");

    match command {
        Command::AddParticipant { name } => {
            ledger.add_participant(&name).map(Applied::ParticipantAdded)
        }
        Command::RemoveParticipant { name } => {
            let removal = match ledger.find_participant(&name).map(|p| p.id) {
                Some(id) => ledger.remove_participant(id),
                None => {
                    debug!(name = %name.trim(), "remove of unknown participant name ignored");
                    Removal::default()
                }
            };
            Ok(Applied::ParticipantRemoved(removal))
        }
        Command::AddOrder {
            drink_name,
            unit_price,
            quantity,
            memo,
            category,
            payers,
        } => {
            let payers = resolve_payers(ledger, &payers)?;
            let mut draft = NewOrder::new(drink_name, unit_price, quantity, payers).with_memo(memo);
            draft.category = category;
            ledger.add_order(draft).map(Applied::OrderAdded)
        }
        Command::Clear => {
            ledger.clear();
            Ok(Applied::Cleared)
        }
    }
}

/// Resolve payer names to ids, failing on the first unknown name
fn resolve_payers(ledger: &Ledger, names: &[String]) -> Result<Vec<ParticipantId>, SplitError> {
    names
        .iter()
        .map(|name| {
            ledger
                .find_participant(name)
                .map(|participant| participant.id)
                .ok_or_else(|| {
                    SplitError::invalid_order(OrderRejection::UnknownPayerName(
                        name.trim().to_string(),
                    ))
                })
        })
        .collect()
}
