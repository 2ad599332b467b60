//! Replay strategy module
//!
//! A replay reads a CSV command log, applies every command to a fresh
//! ledger and writes the resulting settlement as CSV. Strategies differ in
//! how the log is read and how the ledger is held; both produce identical
//! output for the same input.

use crate::cli::StrategyType;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncReplayStrategy, BatchConfig};
pub use sync::SyncReplayStrategy;

/// Replay pipeline from a command log to a settlement report
pub trait ReplayStrategy: Send + Sync {
    /// Replay the command log at `input_path` and write the settlement to `output`
    ///
    /// Rows that cannot be parsed and commands the ledger rejects are logged
    /// and skipped; they never cause this method to fail.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened
    /// - The async runtime cannot be created
    /// - The settlement cannot be computed or written
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a replay strategy for the requested type
///
/// `config` is only used by the async strategy; `None` selects the defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ReplayStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncReplayStrategy),
        StrategyType::Async => Box::new(AsyncReplayStrategy::new(config.unwrap_or_default())),
    }
}
