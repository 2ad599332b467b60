//! Command handlers for the `drink-split` binary
//!
//! Every handler opens a [`Session`] over the JSON state file, performs one
//! operation and prints a short report to `output`. Replays run against a
//! fresh in-memory ledger and never touch the state file.

use super::args::{CliArgs, CliCommand, ExportArgs, OrderCommand, ParticipantCommand, ReplayArgs};
use crate::core::{Applied, Session, Settlement};
use crate::io::csv_format::{format_amount, write_orders_csv, write_settlement_csv};
use crate::storage::JsonFileStore;
use crate::strategy::create_strategy;
use crate::types::{Command, SplitError};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Run the parsed command, writing its report to `output`
pub fn run(args: CliArgs, output: &mut dyn Write) -> Result<(), SplitError> {
    let CliArgs { state, command, .. } = args;
    let open = || -> Result<Session<JsonFileStore>, SplitError> {
        let session = Session::open(JsonFileStore::new(&state))?;
        info!(state = %state.display(), "session opened");
        Ok(session)
    };

    match command {
        CliCommand::Participant(ParticipantCommand::Add { name }) => {
            let mut session = open()?;
            let id = session.add_participant(&name)?;
            writeln!(output, "Added participant {} ({})", name.trim(), id)?;
        }
        CliCommand::Participant(ParticipantCommand::Remove { name }) => {
            let mut session = open()?;
            let Some(id) = session.ledger().find_participant(&name).map(|p| p.id) else {
                writeln!(output, "No participant named '{}'", name.trim())?;
                return Ok(());
            };
            let removal = session.remove_participant(id)?;
            writeln!(
                output,
                "Removed participant {}: {} order(s) deleted, {} order(s) updated",
                name.trim(),
                removal.deleted_orders.len(),
                removal.shrunk_orders.len()
            )?;
        }
        CliCommand::Participant(ParticipantCommand::List) => {
            let session = open()?;
            let participants = session.participants();
            if participants.is_empty() {
                writeln!(output, "No participants")?;
            }
            for participant in participants {
                writeln!(output, "{}\t{}", participant.id, participant.name)?;
            }
        }
        CliCommand::Order(OrderCommand::Add(order)) => {
            let mut session = open()?;
            let command = Command::AddOrder {
                drink_name: order.drink,
                unit_price: order.price,
                quantity: order.quantity,
                memo: order.memo,
                category: order.category,
                payers: order.payers,
            };
            if let Applied::OrderAdded(id) = session.apply(command)? {
                writeln!(output, "Recorded order {}", id)?;
            }
        }
        CliCommand::Order(OrderCommand::List) => {
            write_orders_csv(open()?.ledger(), output, false)?;
        }
        CliCommand::Settle => {
            let settlement = open()?.settle()?;
            write_settlement_table(&settlement, output)?;
        }
        CliCommand::Export(export) => run_export(&open()?, &export, output)?,
        CliCommand::Clear => {
            open()?.clear()?;
            writeln!(output, "Cleared all participants and orders")?;
        }
        CliCommand::Replay(replay) => run_replay(&replay, output)?,
    }

    Ok(())
}

fn run_export(
    session: &Session<JsonFileStore>,
    export: &ExportArgs,
    output: &mut dyn Write,
) -> Result<(), SplitError> {
    let settlement = if export.orders {
        None
    } else {
        Some(session.settle()?)
    };

    match &export.output {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            write_export(session, settlement.as_ref(), export.bom, &mut file)?;
            file.flush()?;
            writeln!(output, "Exported to {}", path.display())?;
        }
        None => write_export(session, settlement.as_ref(), export.bom, output)?,
    }

    Ok(())
}

fn write_export(
    session: &Session<JsonFileStore>,
    settlement: Option<&Settlement>,
    bom: bool,
    target: &mut dyn Write,
) -> Result<(), SplitError> {
    match settlement {
        Some(settlement) => write_settlement_csv(settlement, target, bom),
        None => write_orders_csv(session.ledger(), target, bom),
    }
}

fn run_replay(replay: &ReplayArgs, output: &mut dyn Write) -> Result<(), SplitError> {
    let strategy = create_strategy(replay.strategy.clone(), Some(replay.to_batch_config()));
    strategy
        .process(&replay.input_file, output)
        .map_err(SplitError::replay_failed)
}

/// Human-readable settlement: one padded line per participant and a total
fn write_settlement_table(
    settlement: &Settlement,
    output: &mut dyn Write,
) -> Result<(), SplitError> {
    if settlement.is_empty() {
        writeln!(output, "Nothing to settle")?;
        return Ok(());
    }

    let width = settlement
        .lines
        .iter()
        .map(|line| line.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Total".len());

    for line in &settlement.lines {
        writeln!(
            output,
            "{:<width$}  {:>12}",
            line.name,
            format_amount(line.amount),
            width = width
        )?;
    }
    writeln!(
        output,
        "{:<width$}  {:>12}",
        "Total",
        format_amount(settlement.grand_total),
        width = width
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;
    use tempfile::TempDir;

    fn run_in(state: &Path, argv: &[&str]) -> Result<String, SplitError> {
        let mut full = vec!["drink-split", "--state", state.to_str().unwrap()];
        full.extend_from_slice(argv);
        let args = CliArgs::try_parse_from(full).unwrap();

        let mut output = Vec::new();
        run(args, &mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_state_survives_between_runs() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        run_in(&state, &["participant", "add", "Alice"]).unwrap();
        run_in(&state, &["participant", "add", "Bob"]).unwrap();
        run_in(
            &state,
            &[
                "order", "add", "--drink", "Beer", "--price", "600", "--quantity", "2", "--payer",
                "alice", "--payer", "Bob",
            ],
        )
        .unwrap();

        let csv = run_in(&state, &["export"]).unwrap();
        assert_eq!(csv, "name,amount\nAlice,600.00\nBob,600.00\n");
    }

    #[test]
    fn test_duplicate_participant_is_rejected() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        run_in(&state, &["participant", "add", "Alice"]).unwrap();
        let err = run_in(&state, &["participant", "add", " ALICE "]).unwrap_err();
        assert!(matches!(err, SplitError::DuplicateName { .. }));
    }

    #[test]
    fn test_remove_reports_cascade() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        run_in(&state, &["participant", "add", "Alice"]).unwrap();
        run_in(&state, &["participant", "add", "Bob"]).unwrap();
        run_in(
            &state,
            &["order", "add", "--drink", "Tea", "--price", "300", "--payer", "Alice"],
        )
        .unwrap();
        run_in(
            &state,
            &[
                "order", "add", "--drink", "Beer", "--price", "600", "--payer", "Alice",
                "--payer", "Bob",
            ],
        )
        .unwrap();

        let report = run_in(&state, &["participant", "remove", "alice"]).unwrap();
        assert_eq!(
            report,
            "Removed participant alice: 1 order(s) deleted, 1 order(s) updated\n"
        );

        let csv = run_in(&state, &["export"]).unwrap();
        assert_eq!(csv, "name,amount\nBob,600.00\n");
    }

    #[test]
    fn test_remove_unknown_name_is_noop() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        let report = run_in(&state, &["participant", "remove", "Nobody"]).unwrap();
        assert_eq!(report, "No participant named 'Nobody'\n");
        assert!(!state.exists());
    }

    #[test]
    fn test_settle_table() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        run_in(&state, &["participant", "add", "Al"]).unwrap();
        run_in(
            &state,
            &["order", "add", "--drink", "Wine", "--price", "1000", "--payer", "Al"],
        )
        .unwrap();

        let table = run_in(&state, &["settle"]).unwrap();
        assert_eq!(table, "Al          1000.00\nTotal       1000.00\n");
    }

    #[test]
    fn test_settle_empty_ledger() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        assert_eq!(run_in(&state, &["settle"]).unwrap(), "Nothing to settle\n");
    }

    #[test]
    fn test_export_to_file_with_bom() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");
        let target = dir.path().join("settlement.csv");

        run_in(&state, &["participant", "add", "Zoë"]).unwrap();
        run_in(
            &state,
            &["order", "add", "--drink", "Cider", "--price", "450", "--payer", "Zoë"],
        )
        .unwrap();
        run_in(
            &state,
            &["export", "--bom", "--output", target.to_str().unwrap()],
        )
        .unwrap();

        let bytes = std::fs::read(&target).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(
            std::str::from_utf8(&bytes[3..]).unwrap(),
            "name,amount\nZoë,450.00\n"
        );
    }

    #[test]
    fn test_invalid_order_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        run_in(&state, &["participant", "add", "Alice"]).unwrap();
        let before = std::fs::read_to_string(&state).unwrap();

        let err = run_in(
            &state,
            &["order", "add", "--drink", "Beer", "--price", "0", "--payer", "Alice"],
        )
        .unwrap_err();
        assert!(matches!(err, SplitError::InvalidOrder { .. }));
        assert_eq!(std::fs::read_to_string(&state).unwrap(), before);
    }

    #[test]
    fn test_clear_then_list() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        run_in(&state, &["participant", "add", "Alice"]).unwrap();
        run_in(&state, &["clear"]).unwrap();

        assert_eq!(
            run_in(&state, &["participant", "list"]).unwrap(),
            "No participants\n"
        );
    }

    #[test]
    fn test_replay_missing_file() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.json");

        let err = run_in(&state, &["replay", "does-not-exist.csv"]).unwrap_err();
        assert!(matches!(err, SplitError::ReplayFailed { .. }));
    }
}
