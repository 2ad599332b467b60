//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `participant`: Participant records and identifiers
//! - `order`: Order records, order drafts and identifiers
//! - `command`: Name-addressed commands replayed from a command log
//! - `error`: Error types for drink-split

pub mod command;
pub mod error;
pub mod order;
pub mod participant;

pub use command::{Command, CommandKind};
pub use error::{OrderRejection, SplitError};
pub use order::{NewOrder, Order, OrderId};
pub use participant::{Participant, ParticipantId};
