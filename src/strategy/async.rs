//! Asynchronous replay strategy
//!
//! ```text
//! AsyncReplayStrategy
//!     ├── BatchConfig (batch_size)
//!     ├── AsyncReader (batch CSV reading)
//!     └── SharedSession<MemoryStore> (one mutex section per command)
//! ```
//!
//! Batches are read in file order and their commands are applied one after
//! another, since each command may depend on the ones before it (a removal
//! cascades into every earlier order).

use crate::core::{Session, SharedSession};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_settlement_csv;
use crate::storage::MemoryStore;
use crate::strategy::ReplayStrategy;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Default number of command-log rows read per batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for batched reading
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of command-log rows per batch
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig with a custom batch size
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Rows read per batch. Zero is not a usable size; it
    ///   is logged at `warn` and replaced by [`DEFAULT_BATCH_SIZE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use drink_split::strategy::BatchConfig;
    ///
    /// assert_eq!(BatchConfig::new(250).batch_size, 250);
    /// assert_eq!(BatchConfig::new(0), BatchConfig::default());
    /// ```
    pub fn new(batch_size: usize) -> Self {
        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = DEFAULT_BATCH_SIZE,
                "invalid batch size, using default"
            );
            DEFAULT_BATCH_SIZE
        } else {
            batch_size
        };

        Self { batch_size }
    }
}

/// Batched async replay over a shared session
///
/// Reads the command log with [`AsyncReader`] on a current-thread tokio
/// runtime and applies each command to a [`SharedSession`] backed by a
/// [`MemoryStore`].
///
/// # Configuration
///
/// - `batch_size`: rows read per batch (default: 1000). Batching affects
///   reads only; commands are always applied in file order.
#[derive(Debug, Clone)]
pub struct AsyncReplayStrategy {
    config: BatchConfig,
}

impl AsyncReplayStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ReplayStrategy for AsyncReplayStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let session = Session::open(MemoryStore::new()).map_err(|e| e.to_string())?;
            let shared = SharedSession::new(session);

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut applied = 0usize;
            let mut rejected = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for command in batch {
                    match shared.apply(command).await {
                        Ok(_) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(error = %e, "command rejected");
                        }
                    }
                }
            }
            info!(applied, rejected, "replay finished");

            let settlement = shared.settle().await.map_err(|e| e.to_string())?;
            write_settlement_csv(&settlement, output, false).map_err(|e| e.to_string())?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "op,name,drink,unit_price,quantity,memo,payers,category\n";

    fn create_temp_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{}{}", HEADER, body).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[rstest]
    #[case::zero(0, DEFAULT_BATCH_SIZE)]
    #[case::one(1, 1)]
    #[case::custom(250, 250)]
    fn test_batch_config_new(#[case] requested: usize, #[case] expected: usize) {
        assert_eq!(BatchConfig::new(requested).batch_size, expected);
    }

    #[test]
    fn test_async_replay_two_way_split() {
        let file = create_temp_csv(
            "add_participant,Alice\n\
             add_participant,Bob\n\
             add_order,,Beer,600,2,,Alice;Bob\n",
        );
        let mut output = Vec::new();

        AsyncReplayStrategy::new(BatchConfig::default())
            .process(file.path(), &mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "name,amount\nAlice,600.00\nBob,600.00\n"
        );
    }

    #[test]
    fn test_async_replay_keeps_order_across_batches() {
        // A batch size of 2 splits the removal from the orders it cascades into
        let file = create_temp_csv(
            "add_participant,Alice\n\
             add_participant,Bob\n\
             add_order,,Beer,500,1,,Alice\n\
             add_order,,Pitcher,900,1,,Alice;Bob\n\
             remove_participant,Alice\n",
        );
        let mut output = Vec::new();

        AsyncReplayStrategy::new(BatchConfig::new(2))
            .process(file.path(), &mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "name,amount\nBob,900.00\n"
        );
    }

    #[test]
    fn test_async_replay_handles_missing_file() {
        let mut output = Vec::new();
        let result = AsyncReplayStrategy::new(BatchConfig::default())
            .process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
