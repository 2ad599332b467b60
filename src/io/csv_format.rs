//! CSV format handling for command logs and reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for command-log deserialization
//! - Conversion from CSV records to [`Command`]s
//! - Settlement and order report serialization
//!
//! All functions are pure apart from writing to the supplied writer.

use crate::core::{Ledger, Settlement};
use crate::types::participant::name_key;
use crate::types::{Command, CommandKind, SplitError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// UTF-8 byte order mark, understood by spreadsheet tools
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Separator between names in the `payers` column
pub const PAYER_SEPARATOR: char = ';';

/// CSV record structure for deserialization
///
/// Matches the command-log format with columns:
/// op, name, drink, unit_price, quantity, memo, payers, category.
/// Every column but `op` is optional; trailing columns may be left out.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    pub op: String,
    pub name: Option<String>,
    pub drink: Option<String>,
    pub unit_price: Option<String>,
    pub quantity: Option<String>,
    pub memo: Option<String>,
    pub payers: Option<String>,
    pub category: Option<String>,
}

/// Convert a CsvRecord to a Command
///
/// This function:
/// - Parses the `op` column (case-insensitive)
/// - Requires a name for participant commands
/// - Parses the unit price into a Decimal and the quantity (default 1)
/// - Splits the `payers` column on `;`
///
/// Business validation (empty drink, non-positive price, unknown payers, ...)
/// is left to the ledger so it reports typed errors.
///
/// # Returns
///
/// Result containing either:
/// - Ok(Command) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Command, String> {
    let kind = CommandKind::parse(&csv_record.op)
        .ok_or_else(|| format!("Invalid op: '{}'", csv_record.op))?;

    match kind {
        CommandKind::AddParticipant | CommandKind::RemoveParticipant => {
            let name = non_empty(csv_record.name)
                .ok_or_else(|| format!("{} requires a name", csv_record.op.trim()))?;
            Ok(if kind == CommandKind::AddParticipant {
                Command::AddParticipant { name }
            } else {
                Command::RemoveParticipant { name }
            })
        }
        CommandKind::AddOrder => {
            let unit_price = match non_empty(csv_record.unit_price) {
                Some(price) => Decimal::from_str(&price)
                    .map_err(|_| format!("Invalid unit price '{}'", price))?,
                None => return Err("add_order requires a unit price".to_string()),
            };
            let quantity = match non_empty(csv_record.quantity) {
                Some(quantity) => quantity
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid quantity '{}'", quantity))?,
                None => 1,
            };
            let payers = csv_record
                .payers
                .unwrap_or_default()
                .split(PAYER_SEPARATOR)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();

            Ok(Command::AddOrder {
                drink_name: csv_record.drink.unwrap_or_default(),
                unit_price,
                quantity,
                memo: csv_record.memo.unwrap_or_default(),
                category: non_empty(csv_record.category),
                payers,
            })
        }
        CommandKind::Clear => Ok(Command::Clear),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Format an amount for reports (rounded to 2 decimal places)
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Write a settlement report
///
/// Writes columns `name,amount` with a header row, one line per participant
/// in settlement order, amounts rounded to 2 decimal places. When `bom` is
/// set the output starts with a UTF-8 byte order mark.
pub fn write_settlement_csv(
    settlement: &Settlement,
    output: &mut dyn Write,
    bom: bool,
) -> Result<(), SplitError> {
    if bom {
        output.write_all(UTF8_BOM)?;
    }

    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(["name", "amount"])?;
    for line in &settlement.lines {
        writer.write_record([line.name.as_str(), format_amount(line.amount).as_str()])?;
    }
    writer.flush()?;

    Ok(())
}

/// Write an orders report
///
/// One row per order in insertion order. Payer names are listed in
/// case-insensitive name order and joined with `, `.
pub fn write_orders_csv(
    ledger: &Ledger,
    output: &mut dyn Write,
    bom: bool,
) -> Result<(), SplitError> {
    if bom {
        output.write_all(UTF8_BOM)?;
    }

    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "#",
        "category",
        "drink",
        "unit_price",
        "quantity",
        "total",
        "payer_count",
        "payers",
        "memo",
    ])?;

    for (index, order) in ledger.list_orders().iter().enumerate() {
        let total = order
            .total()
            .ok_or_else(|| SplitError::arithmetic_overflow("order total"))?;

        let mut payers: Vec<&str> = order
            .payers
            .iter()
            .filter_map(|id| ledger.participant(*id))
            .map(|participant| participant.name.as_str())
            .collect();
        payers.sort_by_cached_key(|name| name_key(name));

        writer.write_record([
            (index + 1).to_string(),
            order.category.clone().unwrap_or_default(),
            order.drink_name.clone(),
            format_amount(order.unit_price),
            order.quantity.to_string(),
            format_amount(total),
            payers.len().to_string(),
            payers.join(", "),
            order.memo.clone(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}
