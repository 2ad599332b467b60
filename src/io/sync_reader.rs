//! Synchronous command-log reader with iterator interface
//!
//! Provides a streaming iterator over commands from a CSV command log.
//! Delegates CSV format concerns to the csv_format module.
//!
//! ```no_run
//! use drink_split::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("session.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("Command: {:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::Command;
use csv::{DeserializeRecordsIntoIter, ReaderBuilder, Trim};
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Synchronous command-log reader
///
/// Yields one item per data row. The header is line 1, so the first data
/// row reports as line 2.
pub struct SyncReader {
    rows: DeserializeRecordsIntoIter<File, CsvRecord>,
    line: usize,
}

impl SyncReader {
    /// Open a command log for streaming iteration
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Accept rows that stop short of the header's width
    /// - Use an 8KB buffer
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the command log
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if the file was opened
    /// * `Err(String)` naming the path if it could not be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use drink_split::io::sync_reader::SyncReader;
    /// use std::path::Path;
    ///
    /// match SyncReader::new(Path::new("session.csv")) {
    ///     Ok(reader) => println!("{} rows", reader.count()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let rows = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file)
            .into_deserialize::<CsvRecord>();

        Ok(Self { rows, line: 1 })
    }
}

impl fmt::Debug for SyncReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncReader")
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

impl Iterator for SyncReader {
    type Item = Result<Command, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.line += 1;

        let converted = row
            .map_err(|e| format!("CSV parse error: {}", e))
            .and_then(convert_csv_record);
        Some(converted.map_err(|e| format!("Line {}: {}", self.line, e)))
    }
}
