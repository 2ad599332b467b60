//! In-memory store
//!
//! Holds the last saved snapshot in memory. Used for command-log replays,
//! where nothing should touch the disk, and in tests.

use super::{LedgerSnapshot, LedgerStore};
use crate::core::Ledger;
use crate::types::SplitError;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<LedgerSnapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn snapshot(&self) -> Option<&LedgerSnapshot> {
        self.snapshot.as_ref()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<Ledger>, SplitError> {
        self.snapshot
            .clone()
            .map(LedgerSnapshot::into_ledger)
            .transpose()
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), SplitError> {
        self.snapshot = Some(LedgerSnapshot::capture(ledger));
        self.saves += 1;
        Ok(())
    }
}
