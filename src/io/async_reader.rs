//! Asynchronous command-log reader
//!
//! Pulls rows from any `futures::io::AsyncRead` through csv-async and hands
//! them out in batches of [`Command`]s. Rows keep their file order across
//! batches; a row that fails to parse or convert is logged with its line
//! number and dropped from the batch.

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::Command;
use csv_async::{AsyncDeserializer, AsyncReaderBuilder, Trim};
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Batched command-log reader over an async byte source
pub struct AsyncReader<R: AsyncRead + Unpin> {
    rows: AsyncDeserializer<R>,
    line: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Wrap an async reader whose first line is the command-log header
    ///
    /// # Arguments
    ///
    /// * `reader` - Byte source, e.g. a `tokio::fs::File` behind `compat()`
    pub fn new(reader: R) -> Self {
        let rows = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .create_deserializer(reader);

        Self { rows, line: 1 }
    }

    /// Read the next batch of commands
    ///
    /// Rows are converted with [`convert_csv_record`]. A row that fails to
    /// parse or convert is logged at `warn` with its line number and does
    /// not count towards the batch.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum number of commands to return
    ///
    /// # Returns
    ///
    /// Up to `batch_size` commands in file order. An empty vector means the
    /// end of the input was reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Command> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.rows.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(row) = rows.next().await else {
                break;
            };
            self.line += 1;

            let converted = row
                .map_err(|e| format!("CSV parse error: {}", e))
                .and_then(convert_csv_record);
            match converted {
                Ok(command) => batch.push(command),
                Err(e) => warn!(line = self.line, error = %e, "skipping command-log row"),
            }
        }

        batch
    }
}
