//! Ledger persistence
//!
//! Persisted state mirrors three relations: participants, orders and the
//! order/payer join. A [`LedgerSnapshot`] is the serialisable form; a
//! [`LedgerStore`] decides where snapshots live.
//!
//! # Components
//!
//! - `json_store` - JSON file store with atomic replace on save
//! - `memory` - In-memory store for replays and tests

pub mod json_store;
pub mod memory;

pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

use crate::core::Ledger;
use crate::types::{Order, OrderId, Participant, ParticipantId, SplitError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot format version written by this crate
pub const SNAPSHOT_VERSION: u32 = 1;

/// Backend that loads and saves the ledger
///
/// `save` must either persist the whole ledger or fail without leaving a
/// partially written state behind.
pub trait LedgerStore: Send {
    /// Load the persisted ledger, `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<Ledger>, SplitError>;

    /// Persist the ledger, replacing any previous state
    fn save(&mut self, ledger: &Ledger) -> Result<(), SplitError>;
}

/// Row of the orders relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    pub drink_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Row of the order/payer join relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayerRow {
    pub order_id: OrderId,
    pub participant_id: ParticipantId,
}

/// Serialisable form of a ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub next_participant_id: u32,
    pub next_order_id: u32,
    pub participants: Vec<Participant>,
    pub orders: Vec<OrderRow>,
    pub order_payers: Vec<OrderPayerRow>,
}

impl LedgerSnapshot {
    /// Capture the current state of a ledger
    pub fn capture(ledger: &Ledger) -> Self {
        let participants = ledger.list_participants().into_iter().cloned().collect();

        let mut orders = Vec::new();
        let mut order_payers = Vec::new();
        for order in ledger.list_orders() {
            orders.push(OrderRow {
                id: order.id,
                drink_name: order.drink_name.clone(),
                unit_price: order.unit_price,
                quantity: order.quantity,
                memo: order.memo.clone(),
                category: order.category.clone(),
            });
            order_payers.extend(order.payers.iter().map(|participant_id| OrderPayerRow {
                order_id: order.id,
                participant_id: *participant_id,
            }));
        }

        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            next_participant_id: ledger.next_participant_id(),
            next_order_id: ledger.next_order_id(),
            participants,
            orders,
            order_payers,
        }
    }

    /// Rebuild the ledger, validating every relation
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for an unknown version, payer rows pointing at
    /// missing orders or participants, orders without payers, and any record
    /// the ledger itself would reject.
    pub fn into_ledger(self) -> Result<Ledger, SplitError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SplitError::storage(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }

        let mut payers: BTreeMap<OrderId, BTreeSet<ParticipantId>> = self
            .orders
            .iter()
            .map(|row| (row.id, BTreeSet::new()))
            .collect();
        for row in &self.order_payers {
            payers
                .get_mut(&row.order_id)
                .ok_or_else(|| SplitError::dangling_order(row.order_id))?
                .insert(row.participant_id);
        }

        let orders = self
            .orders
            .into_iter()
            .map(|row| Order {
                payers: payers.remove(&row.id).unwrap_or_default(),
                id: row.id,
                drink_name: row.drink_name,
                unit_price: row.unit_price,
                quantity: row.quantity,
                memo: row.memo,
                category: row.category,
            })
            .collect();

        Ledger::restore(
            self.participants,
            orders,
            self.next_participant_id,
            self.next_order_id,
        )
    }
}
