//! Order-related types
//!
//! This module defines recorded drink orders and the input used to create them.

use super::participant::ParticipantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Maximum drink name length, in characters, after trimming
pub const MAX_DRINK_NAME_CHARS: usize = 50;

/// Maximum memo length, in characters, after trimming
pub const MAX_MEMO_CHARS: usize = 60;

/// Maximum category length, in characters, after trimming
pub const MAX_CATEGORY_CHARS: usize = 50;

/// Order identifier
///
/// Allocated from a monotonically increasing counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded drink order
///
/// The ledger guarantees that `payers` is never empty and only references
/// participants that currently exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Opaque identifier
    pub id: OrderId,

    /// Name of the drink, trimmed and non-empty
    pub drink_name: String,

    /// Price of a single drink (strictly positive)
    pub unit_price: Decimal,

    /// Number of drinks ordered (at least 1)
    pub quantity: u32,

    /// Free-form note, possibly empty
    pub memo: String,

    /// Menu category the drink was picked from, if any
    pub category: Option<String>,

    /// Participants sharing the cost of this order
    pub payers: BTreeSet<ParticipantId>,
}

impl Order {
    /// Total cost of the order (unit price × quantity)
    ///
    /// Returns `None` if the multiplication overflows. The ledger rejects such
    /// orders on creation, so a stored order always has a total.
    pub fn total(&self) -> Option<Decimal> {
        order_total(self.unit_price, self.quantity)
    }
}

/// Multiply a unit price by a quantity with overflow checking
///
/// `None` also when the product would have to be rounded to fit, which
/// shows up as a scale below the unit price's.
pub fn order_total(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
    let total = unit_price.checked_mul(Decimal::from(quantity))?;
    (total.scale() >= unit_price.scale()).then_some(total)
}

/// Input for [`crate::core::Ledger::add_order`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub drink_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub memo: String,
    pub category: Option<String>,
    pub payers: Vec<ParticipantId>,
}

impl NewOrder {
    /// Create an order draft with an empty memo and no category
    pub fn new(
        drink_name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
        payers: Vec<ParticipantId>,
    ) -> Self {
        NewOrder {
            drink_name: drink_name.into(),
            unit_price,
            quantity,
            memo: String::new(),
            category: None,
            payers,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
