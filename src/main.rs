//! Drink Split CLI
//!
//! Command-line interface for splitting a drinks bill.
//!
//! # Usage
//!
//! ```bash
//! drink-split participant add Alice
//! drink-split participant add Bob
//! drink-split order add --drink Beer --price 600 --quantity 2 --payer Alice --payer Bob
//! drink-split settle
//! drink-split export --bom --output settlement.csv
//! drink-split replay session.csv > settlement.csv
//! ```
//!
//! State lives in `drink_orders.json` unless `--state` or
//! `DRINK_SPLIT_STATE` says otherwise.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid name or order, unreadable state, failed export, etc.)

use drink_split::{cli, logging};
use std::io::Write;
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init(args.log_format);

    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    let result = cli::run(args, &mut output);
    let _ = output.flush();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
