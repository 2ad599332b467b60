//! Persistent ledger session
//!
//! A `Session` pairs a [`Ledger`] with a [`LedgerStore`]. Each mutation runs
//! against a staged copy of the ledger; the staged copy is saved and only
//! then becomes the live ledger. Validation or storage failures therefore
//! leave the live ledger exactly as it was.

use crate::core::engine::{self, Applied};
use crate::core::ledger::{Ledger, Removal};
use crate::core::settlement::{self, Settlement};
use crate::storage::LedgerStore;
use crate::types::{Command, NewOrder, Order, OrderId, Participant, ParticipantId, SplitError};
use tracing::warn;

/// A ledger whose every mutation is persisted before it is visible
#[derive(Debug)]
pub struct Session<S: LedgerStore> {
    ledger: Ledger,
    store: S,
}

impl<S: LedgerStore> Session<S> {
    /// Open a session, loading any previously persisted ledger
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisted state exists but cannot be loaded.
    pub fn open(store: S) -> Result<Self, SplitError> {
        let ledger = store.load()?.unwrap_or_default();
        Ok(Session { ledger, store })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn add_participant(&mut self, name: &str) -> Result<ParticipantId, SplitError> {
        self.commit(|ledger| ledger.add_participant(name))
    }

    /// Remove a participant; unknown ids are a no-op and are not persisted
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<Removal, SplitError> {
        if self.ledger.participant(id).is_none() {
            return Ok(Removal::default());
        }
        self.commit(|ledger| Ok(ledger.remove_participant(id)))
    }

    pub fn add_order(&mut self, draft: NewOrder) -> Result<OrderId, SplitError> {
        self.commit(|ledger| ledger.add_order(draft))
    }

    pub fn clear(&mut self) -> Result<(), SplitError> {
        self.commit(|ledger| {
            ledger.clear();
            Ok(())
        })
    }

    /// Apply a name-addressed command
    pub fn apply(&mut self, command: Command) -> Result<Applied, SplitError> {
        self.commit(|ledger| engine::apply(ledger, command))
    }

    pub fn participants(&self) -> Vec<&Participant> {
        self.ledger.list_participants()
    }

    pub fn orders(&self) -> &[Order] {
        self.ledger.list_orders()
    }

    pub fn settle(&self) -> Result<Settlement, SplitError> {
        settlement::settle(&self.ledger)
    }

    /// Run a mutation on a staged copy, persist it, then make it live
    fn commit<T, F>(&mut self, mutation: F) -> Result<T, SplitError>
    where
        F: FnOnce(&mut Ledger) -> Result<T, SplitError>,
    {
        let mut staged = self.ledger.clone();
        let outcome = mutation(&mut staged)?;

        if let Err(e) = self.store.save(&staged) {
            warn!(error = %e, "save failed, mutation discarded");
            return Err(e);
        }

        self.ledger = staged;
        Ok(outcome)
    }
}
