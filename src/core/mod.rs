//! Core business logic module
//!
//! This module contains the bill-splitting components:
//! - `ledger` - Participant and order records with referential invariants
//! - `settlement` - Per-participant totals computed from a ledger
//! - `engine` - Name-addressed command dispatch
//! - `session` - Ledger plus store, persisting every mutation
//! - `shared` - Session shared between async tasks under one mutex

pub mod engine;
pub mod ledger;
pub mod session;
pub mod settlement;
pub mod shared;

pub use engine::{apply, Applied};
pub use ledger::{Ledger, Removal};
pub use session::Session;
pub use settlement::{settle, Settlement, SettlementLine};
pub use shared::SharedSession;
