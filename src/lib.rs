//! Drink Split Library
//! # Overview
//!
//! This library splits a shared drinks bill. Participants are registered by
//! name, orders record which participants share each drink, and a
//! settlement tells everyone what they owe.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Participant, Order, Command, errors)
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Participant and order records with cascade removal
//!   - [`core::settlement`] - Exact per-participant totals
//!   - [`core::engine`] - Name-addressed command dispatch
//!   - [`core::session`] - Ledger persisted on every mutation
//!   - [`core::shared`] - Session shared between async tasks
//! - [`storage`] - Ledger snapshots and the JSON file store
//! - [`io`] - Command-log reading and CSV reports
//! - [`strategy`] - Sync and async command-log replay
//! - [`cli`] - CLI arguments and command handlers
//! - [`logging`] - tracing subscriber setup
//!
//! # Splitting Rules
//!
//! - An order's total is `unit_price * quantity`, shared evenly by its payers
//! - Shares are exact: every order's shares add up to its total
//! - Removing a participant drops them from every order; orders left with no
//!   payer are deleted
//! - Settlement lists participants by amount owed, highest first, ties by name

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod storage;
pub mod strategy;
pub mod types;

pub use core::{apply, settle, Ledger, Removal, Session, Settlement, SettlementLine, SharedSession};
pub use io::{write_orders_csv, write_settlement_csv};
pub use storage::{JsonFileStore, LedgerStore, MemoryStore};
pub use types::{
    Command, NewOrder, Order, OrderId, OrderRejection, Participant, ParticipantId, SplitError,
};
