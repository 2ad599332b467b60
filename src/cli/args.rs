use crate::logging::LogFormat;
use crate::strategy::BatchConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

/// Default state file, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = "drink_orders.json";

/// Split a drinks bill between the people who shared each order
#[derive(Parser, Debug)]
#[command(name = "drink-split")]
#[command(about = "Split a drinks bill between the people who shared each order", long_about = None)]
pub struct CliArgs {
    /// JSON file holding participants and orders between runs
    #[arg(
        long = "state",
        value_name = "PATH",
        env = "DRINK_SPLIT_STATE",
        default_value = DEFAULT_STATE_FILE,
        global = true
    )]
    pub state: PathBuf,

    /// Log line format (logs go to stderr, filtered by RUST_LOG)
    #[arg(
        long = "log-format",
        value_name = "FORMAT",
        env = "DRINK_SPLIT_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Manage participants
    #[command(subcommand)]
    Participant(ParticipantCommand),

    /// Record and list orders
    #[command(subcommand)]
    Order(OrderCommand),

    /// Show what everyone owes
    Settle,

    /// Write the settlement (or the order list) as CSV
    Export(ExportArgs),

    /// Remove all participants and orders
    Clear,

    /// Replay a CSV command log and print the settlement as CSV
    Replay(ReplayArgs),
}

#[derive(Subcommand, Debug)]
pub enum ParticipantCommand {
    /// Register a participant
    Add {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Remove a participant; orders left without payers are deleted
    Remove {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List participants
    List,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Record an order
    Add(OrderAddArgs),

    /// List orders as CSV
    List,
}

#[derive(Args, Debug)]
pub struct OrderAddArgs {
    /// Name of the drink
    #[arg(long = "drink", value_name = "DRINK")]
    pub drink: String,

    /// Price of a single drink
    #[arg(long = "price", value_name = "PRICE", value_parser = parse_price)]
    pub price: Decimal,

    /// Number of drinks
    #[arg(long = "quantity", value_name = "COUNT", default_value_t = 1)]
    pub quantity: u32,

    /// Optional note
    #[arg(long = "memo", value_name = "TEXT", default_value = "")]
    pub memo: String,

    /// Menu category
    #[arg(long = "category", value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Participant sharing the cost (repeat for each payer)
    #[arg(long = "payer", value_name = "NAME", required = true)]
    pub payers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (defaults to stdout)
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Prefix the output with a UTF-8 byte order mark
    #[arg(long = "bom")]
    pub bom: bool,

    /// Export the order list instead of the settlement
    #[arg(long = "orders")]
    pub orders: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// CSV command log
    #[arg(value_name = "INPUT", help = "Path to the CSV command log")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' or 'async' (batched reads over a shared session)"
    )]
    pub strategy: StrategyType,

    /// Number of rows per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of rows per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,
}

/// Available replay strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl ReplayArgs {
    /// Build a BatchConfig from the arguments, falling back to defaults
    pub fn to_batch_config(&self) -> BatchConfig {
        match self.batch_size {
            Some(batch_size) => BatchConfig::new(batch_size),
            None => BatchConfig::default(),
        }
    }
}

fn parse_price(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("invalid price '{}': {}", value, e))
}
