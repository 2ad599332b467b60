//! Synchronous replay strategy
//!
//! Streams the command log through [`SyncReader`] and applies each command
//! directly to a [`Ledger`] on the calling thread.

use crate::core::{engine, settle, Ledger};
use crate::io::csv_format::write_settlement_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ReplayStrategy;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Single-threaded replay
///
/// ```no_run
/// use drink_split::strategy::{ReplayStrategy, SyncReplayStrategy};
/// use std::path::Path;
///
/// let mut output = std::io::stdout();
/// SyncReplayStrategy
///     .process(Path::new("session.csv"), &mut output)
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncReplayStrategy;

impl ReplayStrategy for SyncReplayStrategy {
    /// Replay the command log and write the settlement CSV
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the command log
    /// * `output` - Destination for the `name,amount` report
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the settlement has been written; skipped rows and
    ///   rejected commands are logged, not returned
    /// * `Err(String)` if the file cannot be opened or the report cannot be
    ///   computed or written
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let mut ledger = Ledger::new();
        let reader = SyncReader::new(input_path)?;

        let mut applied = 0usize;
        let mut skipped = 0usize;
        for result in reader {
            match result {
                Ok(command) => match engine::apply(&mut ledger, command) {
                    Ok(_) => applied += 1,
                    Err(e) => {
                        skipped += 1;
                        warn!(error = %e, "command rejected");
                    }
                },
                Err(e) => {
                    skipped += 1;
                    warn!(error = %e, "skipping command-log row");
                }
            }
        }
        info!(applied, skipped, "replay finished");

        let settlement = settle(&ledger).map_err(|e| e.to_string())?;
        write_settlement_csv(&settlement, output, false).map_err(|e| e.to_string())?;

        Ok(())
    }
}
