//! Error types for drink-split
//!
//! Every failure in this crate is recoverable: validation failures are
//! reported to the caller and leave the ledger untouched.
//!
//! # Error Categories
//!
//! - **Participant Errors**: empty, overlong or duplicate names
//! - **Order Errors**: see [`OrderRejection`]
//! - **Arithmetic Errors**: overflow while summing totals
//! - **Storage Errors**: state file could not be read, parsed or written
//! - **I/O and CSV Errors**: report output and command-log input

use super::order::OrderId;
use super::participant::ParticipantId;
use thiserror::Error;

/// Reason an order was rejected by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRejection {
    #[error("drink name is empty")]
    EmptyDrinkName,

    #[error("unit price must be greater than zero")]
    NonPositivePrice,

    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("no payers selected")]
    NoPayers,

    #[error("unknown payer id {0}")]
    UnknownPayer(ParticipantId),

    #[error("unknown payer '{0}'")]
    UnknownPayerName(String),

    #[error("{field} exceeds {max} characters")]
    FieldTooLong {
        /// Name of the offending field
        field: &'static str,
        /// Maximum length in characters
        max: usize,
    },

    #[error("unit price times quantity overflows")]
    TotalOverflow,
}

/// Main error type for drink-split
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    /// A participant with the same name (ignoring case) already exists
    #[error("A participant named '{name}' already exists")]
    DuplicateName {
        /// The rejected name, trimmed
        name: String,
    },

    /// Participant name is empty after trimming
    #[error("Participant name is empty")]
    EmptyName,

    /// Participant name exceeds the length limit
    #[error("Participant name '{name}' exceeds {max} characters")]
    NameTooLong {
        /// The rejected name, trimmed
        name: String,
        /// Maximum length in characters
        max: usize,
    },

    /// Order failed validation
    #[error("Invalid order: {reason}")]
    InvalidOrder {
        /// Why the order was rejected
        reason: OrderRejection,
    },

    /// Arithmetic overflow while computing totals
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },

    /// Persisted state could not be loaded or saved
    ///
    /// The in-memory ledger is left unchanged when this is returned from a
    /// mutation.
    #[error("Storage error: {message}")]
    StorageError {
        /// Description of the storage failure
        message: String,
    },

    /// I/O error while writing a report
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV reading or writing failed
    #[error("CSV error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    CsvError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the CSV error
        message: String,
    },

    /// A command log could not be replayed at all
    #[error("Replay failed: {message}")]
    ReplayFailed {
        /// Description of the fatal replay error
        message: String,
    },
}

impl From<std::io::Error> for SplitError {
    fn from(error: std::io::Error) -> Self {
        SplitError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for SplitError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        SplitError::CsvError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<OrderRejection> for SplitError {
    fn from(reason: OrderRejection) -> Self {
        SplitError::InvalidOrder { reason }
    }
}

impl SplitError {
    pub fn duplicate_name(name: &str) -> Self {
        SplitError::DuplicateName {
            name: name.to_string(),
        }
    }

    pub fn name_too_long(name: &str, max: usize) -> Self {
        SplitError::NameTooLong {
            name: name.to_string(),
            max,
        }
    }

    pub fn invalid_order(reason: OrderRejection) -> Self {
        SplitError::InvalidOrder { reason }
    }

    pub fn arithmetic_overflow(operation: &str) -> Self {
        SplitError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        SplitError::StorageError {
            message: message.into(),
        }
    }

    pub fn replay_failed(message: impl Into<String>) -> Self {
        SplitError::ReplayFailed {
            message: message.into(),
        }
    }

    /// Storage error for an order row that references a missing order
    pub fn dangling_order(order: OrderId) -> Self {
        SplitError::storage(format!("payer row references missing order {}", order))
    }

    /// Storage error for a payer row that references a missing participant
    pub fn dangling_participant(order: OrderId, participant: ParticipantId) -> Self {
        SplitError::storage(format!(
            "order {} references missing participant {}",
            order, participant
        ))
    }
}
