//! Participant and order ledger
//!
//! This module provides the `Ledger` struct which exclusively owns all
//! participants and orders and keeps them referentially consistent.
//!
//! The Ledger is responsible for:
//! - Registering participants with case-insensitively unique names
//! - Validating and recording orders
//! - Cascading participant removal into payer sets and orders
//! - Providing ordered snapshots for settlement and output
//!
//! Every operation either applies completely or returns an error without
//! touching the ledger.

use crate::types::order::{order_total, MAX_CATEGORY_CHARS, MAX_DRINK_NAME_CHARS, MAX_MEMO_CHARS};
use crate::types::participant::{name_key, MAX_NAME_CHARS};
use crate::types::{
    NewOrder, Order, OrderId, OrderRejection, Participant, ParticipantId, SplitError,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Outcome of [`Ledger::remove_participant`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Removal {
    /// The removed participant, `None` if the id was unknown
    pub participant: Option<Participant>,

    /// Orders deleted because their payer set became empty
    pub deleted_orders: Vec<OrderId>,

    /// Orders that lost a payer but kept at least one
    pub shrunk_orders: Vec<OrderId>,
}

impl Removal {
    /// Whether the call changed the ledger
    pub fn is_noop(&self) -> bool {
        self.participant.is_none()
    }
}

/// Validated text fields of an order
struct OrderFields {
    drink_name: String,
    memo: String,
    category: Option<String>,
}

/// Owns participants and orders and enforces their invariants
///
/// Orders refer to participants by id only. Removing a participant prunes
/// it from every payer set and deletes orders left without payers, so no
/// order ever references a missing participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    /// Participants keyed by id
    participants: BTreeMap<ParticipantId, Participant>,

    /// Orders in insertion order
    orders: Vec<Order>,

    /// Next participant id to hand out
    next_participant_id: u32,

    /// Next order id to hand out
    next_order_id: u32,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Ledger {
            participants: BTreeMap::new(),
            orders: Vec::new(),
            next_participant_id: 1,
            next_order_id: 1,
        }
    }

    /// Register a participant
    ///
    /// The name is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The trimmed name is empty (`EmptyName`)
    /// - The name exceeds the length limit (`NameTooLong`)
    /// - A participant with the same name ignoring case exists (`DuplicateName`)
    pub fn add_participant(&mut self, name: &str) -> Result<ParticipantId, SplitError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SplitError::EmptyName);
        }
        if exceeds(name, MAX_NAME_CHARS) {
            return Err(SplitError::name_too_long(name, MAX_NAME_CHARS));
        }
        if self.find_participant(name).is_some() {
            return Err(SplitError::duplicate_name(name));
        }

        let id = ParticipantId(self.next_participant_id);
        self.next_participant_id = self
            .next_participant_id
            .checked_add(1)
            .ok_or_else(|| SplitError::arithmetic_overflow("participant id allocation"))?;

        self.participants.insert(id, Participant::new(id, name));
        debug!(participant_id = %id, name, "participant added");

        Ok(id)
    }

    /// Remove a participant and cascade into orders
    ///
    /// The participant is pruned from every payer set; orders whose payer
    /// set becomes empty are deleted. Unknown ids are a no-op.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Removal {
        let Some(participant) = self.participants.remove(&id) else {
            debug!(participant_id = %id, "remove of unknown participant ignored");
            return Removal::default();
        };

        let mut removal = Removal {
            participant: Some(participant),
            ..Removal::default()
        };

        for order in self.orders.iter_mut() {
            if order.payers.remove(&id) && !order.payers.is_empty() {
                removal.shrunk_orders.push(order.id);
            }
        }

        self.orders.retain(|order| {
            if order.payers.is_empty() {
                removal.deleted_orders.push(order.id);
                false
            } else {
                true
            }
        });

        info!(
            participant_id = %id,
            deleted_orders = removal.deleted_orders.len(),
            shrunk_orders = removal.shrunk_orders.len(),
            "participant removed"
        );

        removal
    }

    /// Record an order
    ///
    /// Text fields are trimmed; an empty category is stored as `None`.
    /// Duplicate payer ids collapse into one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOrder` if:
    /// - The drink name is empty or too long
    /// - The unit price is not greater than zero
    /// - The quantity is zero
    /// - Unit price × quantity overflows
    /// - No payers are given, or a payer id is unknown
    /// - The memo or category is too long
    pub fn add_order(&mut self, draft: NewOrder) -> Result<OrderId, SplitError> {
        let fields = validate_order(
            &draft.drink_name,
            draft.unit_price,
            draft.quantity,
            &draft.memo,
            draft.category.as_deref(),
        )?;

        if draft.payers.is_empty() {
            return Err(SplitError::invalid_order(OrderRejection::NoPayers));
        }
        if let Some(unknown) = draft
            .payers
            .iter()
            .find(|payer| !self.participants.contains_key(payer))
        {
            return Err(SplitError::invalid_order(OrderRejection::UnknownPayer(
                *unknown,
            )));
        }

        let id = OrderId(self.next_order_id);
        self.next_order_id = self
            .next_order_id
            .checked_add(1)
            .ok_or_else(|| SplitError::arithmetic_overflow("order id allocation"))?;

        let order = Order {
            id,
            drink_name: fields.drink_name,
            unit_price: draft.unit_price,
            quantity: draft.quantity,
            memo: fields.memo,
            category: fields.category,
            payers: draft.payers.into_iter().collect(),
        };
        debug!(
            order_id = %id,
            drink = %order.drink_name,
            unit_price = %order.unit_price,
            quantity = order.quantity,
            payers = order.payers.len(),
            "order added"
        );
        self.orders.push(order);

        Ok(id)
    }

    /// Participants ordered by case-insensitive name, ties by id
    pub fn list_participants(&self) -> Vec<&Participant> {
        let mut participants: Vec<&Participant> = self.participants.values().collect();
        participants.sort_by_cached_key(|participant| (participant.name_key(), participant.id));
        participants
    }

    /// Orders in insertion order
    pub fn list_orders(&self) -> &[Order] {
        &self.orders
    }

    /// Remove all participants and orders
    ///
    /// Id counters keep running so ids are never reused.
    pub fn clear(&mut self) {
        info!(
            participants = self.participants.len(),
            orders = self.orders.len(),
            "ledger cleared"
        );
        self.participants.clear();
        self.orders.clear();
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Look up a participant by name, ignoring case and surrounding whitespace
    pub fn find_participant(&self, name: &str) -> Option<&Participant> {
        let key = name_key(name);
        self.participants
            .values()
            .find(|participant| participant.name_key() == key)
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty() && self.orders.is_empty()
    }

    pub(crate) fn next_participant_id(&self) -> u32 {
        self.next_participant_id
    }

    pub(crate) fn next_order_id(&self) -> u32 {
        self.next_order_id
    }

    /// Rebuild a ledger from persisted records
    ///
    /// Applies the same validation as the mutating operations and reports
    /// any violation as a `StorageError`.
    pub(crate) fn restore(
        participants: Vec<Participant>,
        orders: Vec<Order>,
        next_participant_id: u32,
        next_order_id: u32,
    ) -> Result<Self, SplitError> {
        let mut ledger = Ledger::new();
        let mut keys = BTreeSet::new();

        for mut participant in participants {
            let name = participant.name.trim().to_string();
            if name.is_empty() || exceeds(&name, MAX_NAME_CHARS) {
                return Err(SplitError::storage(format!(
                    "participant {} has an invalid name",
                    participant.id
                )));
            }
            participant.name = name;
            if participant.id.0 >= next_participant_id {
                return Err(SplitError::storage(format!(
                    "participant id {} is not below the id counter {}",
                    participant.id, next_participant_id
                )));
            }
            if !keys.insert(participant.name_key()) {
                return Err(SplitError::storage(format!(
                    "duplicate participant name '{}'",
                    participant.name
                )));
            }
            if ledger
                .participants
                .insert(participant.id, participant.clone())
                .is_some()
            {
                return Err(SplitError::storage(format!(
                    "duplicate participant id {}",
                    participant.id
                )));
            }
        }

        let mut order_ids = BTreeSet::new();
        for order in orders {
            if !order_ids.insert(order.id) {
                return Err(SplitError::storage(format!("duplicate order id {}", order.id)));
            }
            if order.id.0 >= next_order_id {
                return Err(SplitError::storage(format!(
                    "order id {} is not below the id counter {}",
                    order.id, next_order_id
                )));
            }
            validate_order(
                &order.drink_name,
                order.unit_price,
                order.quantity,
                &order.memo,
                order.category.as_deref(),
            )
            .map_err(|e| SplitError::storage(format!("order {}: {}", order.id, e)))?;
            if order.payers.is_empty() {
                return Err(SplitError::storage(format!(
                    "order {} has no payers",
                    order.id
                )));
            }
            if let Some(missing) = order
                .payers
                .iter()
                .find(|payer| !ledger.participants.contains_key(payer))
            {
                return Err(SplitError::dangling_participant(order.id, *missing));
            }
            ledger.orders.push(order);
        }

        ledger.next_participant_id = next_participant_id;
        ledger.next_order_id = next_order_id;
        Ok(ledger)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn exceeds(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// Validate the scalar fields of an order and return the trimmed text
fn validate_order(
    drink_name: &str,
    unit_price: Decimal,
    quantity: u32,
    memo: &str,
    category: Option<&str>,
) -> Result<OrderFields, OrderRejection> {
    let drink_name = drink_name.trim();
    if drink_name.is_empty() {
        return Err(OrderRejection::EmptyDrinkName);
    }
    if exceeds(drink_name, MAX_DRINK_NAME_CHARS) {
        return Err(OrderRejection::FieldTooLong {
            field: "drink name",
            max: MAX_DRINK_NAME_CHARS,
        });
    }
    if unit_price <= Decimal::ZERO {
        return Err(OrderRejection::NonPositivePrice);
    }
    if quantity < 1 {
        return Err(OrderRejection::ZeroQuantity);
    }
    if order_total(unit_price, quantity).is_none() {
        return Err(OrderRejection::TotalOverflow);
    }

    let memo = memo.trim();
    if exceeds(memo, MAX_MEMO_CHARS) {
        return Err(OrderRejection::FieldTooLong {
            field: "memo",
            max: MAX_MEMO_CHARS,
        });
    }

    let category = category.map(str::trim).filter(|c| !c.is_empty());
    if category.is_some_and(|c| exceeds(c, MAX_CATEGORY_CHARS)) {
        return Err(OrderRejection::FieldTooLong {
            field: "category",
            max: MAX_CATEGORY_CHARS,
        });
    }

    Ok(OrderFields {
        drink_name: drink_name.to_string(),
        memo: memo.to_string(),
        category: category.map(str::to_string),
    })
}
