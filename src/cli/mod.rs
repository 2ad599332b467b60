// CLI module
// Argument parsing and command handlers for the drink-split binary

mod args;
mod commands;

pub use args::{
    CliArgs, CliCommand, ExportArgs, OrderAddArgs, OrderCommand, ParticipantCommand, ReplayArgs,
    StrategyType, DEFAULT_STATE_FILE,
};
pub use commands::run;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints its message and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
