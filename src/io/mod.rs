//! I/O module
//!
//! Handles command-log parsing and report output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, report serialization)
//! - `sync_reader` - Synchronous command-log reader with iterator interface
//! - `async_reader` - Asynchronous command-log reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_csv_record, format_amount, write_orders_csv, write_settlement_csv, CsvRecord,
};
pub use sync_reader::SyncReader;
