//! Shared session for async callers
//!
//! Wraps a [`Session`] in `Arc<tokio::sync::Mutex<_>>`. Each mutating call
//! takes the lock exactly once, so a participant removal, the payer-set
//! pruning and the order cascade it triggers are never observed half-applied.
//! Read methods return owned snapshots taken under the same lock.

use crate::core::engine::Applied;
use crate::core::ledger::Removal;
use crate::core::session::Session;
use crate::core::settlement::Settlement;
use crate::storage::LedgerStore;
use crate::types::{Command, NewOrder, Order, OrderId, Participant, ParticipantId, SplitError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable handle to a session shared between tasks
#[derive(Debug)]
pub struct SharedSession<S: LedgerStore> {
    inner: Arc<Mutex<Session<S>>>,
}

impl<S: LedgerStore> Clone for SharedSession<S> {
    fn clone(&self) -> Self {
        SharedSession {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LedgerStore> SharedSession<S> {
    pub fn new(session: Session<S>) -> Self {
        SharedSession {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn add_participant(&self, name: &str) -> Result<ParticipantId, SplitError> {
        self.inner.lock().await.add_participant(name)
    }

    pub async fn remove_participant(&self, id: ParticipantId) -> Result<Removal, SplitError> {
        self.inner.lock().await.remove_participant(id)
    }

    pub async fn add_order(&self, draft: NewOrder) -> Result<OrderId, SplitError> {
        self.inner.lock().await.add_order(draft)
    }

    pub async fn clear(&self) -> Result<(), SplitError> {
        self.inner.lock().await.clear()
    }

    pub async fn apply(&self, command: Command) -> Result<Applied, SplitError> {
        self.inner.lock().await.apply(command)
    }

    pub async fn participants(&self) -> Vec<Participant> {
        self.inner
            .lock()
            .await
            .participants()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.inner.lock().await.orders().to_vec()
    }

    pub async fn settle(&self) -> Result<Settlement, SplitError> {
        self.inner.lock().await.settle()
    }
}
