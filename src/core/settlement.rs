//! Settlement calculation
//!
//! Turns a ledger snapshot into the amount each participant owes.
//!
//! Each order's total is split evenly across its payers in integer units of
//! the last decimal place. Shares carry at least [`SHARE_SCALE`] places
//! (fewer only when the total is too large to hold them) and the leftover
//! units go to payers one at a time in name order, so the shares of an
//! order always add up to its total exactly. Running totals that would
//! overflow or lose precision are reported as `ArithmeticOverflow`.

use crate::core::ledger::Ledger;
use crate::types::participant::name_key;
use crate::types::{Order, ParticipantId, SplitError};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Minimum number of decimal places used for per-payer shares
pub const SHARE_SCALE: u32 = 4;

/// Largest mantissa a `Decimal` can hold (96 bits)
const MAX_MANTISSA: i128 = (1 << 96) - 1;

/// One participant's line in a settlement
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementLine {
    pub participant: ParticipantId,
    pub name: String,
    pub amount: Decimal,
}

/// Amount owed by every participant
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// Lines sorted by amount descending, then name ascending ignoring case
    pub lines: Vec<SettlementLine>,

    /// Sum of all order totals
    pub grand_total: Decimal,
}

impl Settlement {
    /// Amount owed by a participant, `None` if they are not in the settlement
    pub fn amount_for(&self, participant: ParticipantId) -> Option<Decimal> {
        self.lines
            .iter()
            .find(|line| line.participant == participant)
            .map(|line| line.amount)
    }

    /// Sum of the participant amounts
    pub fn allocated_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Compute what every participant owes
///
/// Every participant appears in the result, starting from zero. Each order's
/// total is split across its payers with [`split_evenly`].
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a running total overflows or would have
/// to be rounded to fit.
pub fn settle(ledger: &Ledger) -> Result<Settlement, SplitError> {
    let participants = ledger.list_participants();
    let mut totals: HashMap<ParticipantId, Decimal> = participants
        .iter()
        .map(|participant| (participant.id, Decimal::ZERO))
        .collect();

    let mut grand_total = Decimal::ZERO;
    for order in ledger.list_orders() {
        let total = order
            .total()
            .ok_or_else(|| SplitError::arithmetic_overflow("order total"))?;
        grand_total = exact_add(grand_total, total)
            .ok_or_else(|| SplitError::arithmetic_overflow("grand total"))?;

        let payers = payers_in_name_order(ledger, order);
        for (payer, share) in payers.iter().zip(split_evenly(total, payers.len())?) {
            let running = totals.entry(*payer).or_insert(Decimal::ZERO);
            *running = exact_add(*running, share)
                .ok_or_else(|| SplitError::arithmetic_overflow("participant total"))?;
        }
    }

    let mut lines: Vec<SettlementLine> = participants
        .into_iter()
        .map(|participant| SettlementLine {
            participant: participant.id,
            name: participant.name.clone(),
            amount: totals
                .get(&participant.id)
                .copied()
                .unwrap_or(Decimal::ZERO),
        })
        .collect();

    // Participants are already in name order; a stable sort keeps it for ties
    lines.sort_by(|a, b| b.amount.cmp(&a.amount));

    Ok(Settlement { lines, grand_total })
}

/// Payers of an order, ordered by case-insensitive name then id
fn payers_in_name_order(ledger: &Ledger, order: &Order) -> Vec<ParticipantId> {
    let mut payers: Vec<(String, ParticipantId)> = order
        .payers
        .iter()
        .map(|id| {
            let key = ledger
                .participant(*id)
                .map(|participant| name_key(&participant.name))
                .unwrap_or_default();
            (key, *id)
        })
        .collect();
    payers.sort();
    payers.into_iter().map(|(_, id)| id).collect()
}

/// Split an amount into `parts` shares that sum to it exactly
///
/// The amount is counted in units of its last decimal place, refined to
/// [`SHARE_SCALE`] places when the mantissa has room. Every share gets the
/// integer quotient; the remainder, always smaller than `parts`, adds one
/// unit each to the leading shares.
///
/// # Arguments
///
/// * `total` - Amount to split
/// * `parts` - Number of shares
///
/// # Returns
///
/// `parts` shares (empty when `parts` is zero), or `ArithmeticOverflow` if
/// a share cannot be represented.
///
/// # Examples
///
/// ```
/// use drink_split::core::settlement::split_evenly;
/// use rust_decimal::Decimal;
///
/// let shares = split_evenly(Decimal::new(100, 0), 3).unwrap();
/// assert_eq!(shares, vec![
///     Decimal::new(333334, 4),
///     Decimal::new(333333, 4),
///     Decimal::new(333333, 4),
/// ]);
/// ```
pub fn split_evenly(total: Decimal, parts: usize) -> Result<Vec<Decimal>, SplitError> {
    if parts == 0 {
        return Ok(Vec::new());
    }

    let (units, scale) = share_units(total);
    let count =
        i128::try_from(parts).map_err(|_| SplitError::arithmetic_overflow("order share"))?;
    let base = units / count;
    let extra = (units % count).unsigned_abs() as usize;
    let step = units.signum();

    (0..parts)
        .map(|index| {
            let share = if index < extra { base + step } else { base };
            Decimal::try_from_i128_with_scale(share, scale)
                .map_err(|_| SplitError::arithmetic_overflow("order share"))
        })
        .collect()
}

/// Add two amounts, failing where `Decimal` would round the sum to fit
///
/// An exact sum keeps the larger operand scale; a rounded one has fewer
/// decimal places.
fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    (sum.scale() >= a.scale().max(b.scale())).then_some(sum)
}

/// `total` as a count of units at the finest scale up to `SHARE_SCALE` that fits
fn share_units(total: Decimal) -> (i128, u32) {
    let mut units = total.mantissa();
    let mut scale = total.scale();
    while scale < SHARE_SCALE {
        let finer = units * 10;
        if finer.abs() > MAX_MANTISSA {
            break;
        }
        units = finer;
        scale += 1;
    }
    (units, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewOrder, OrderRejection};
    use proptest::prelude::*;
    use rstest::rstest;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_settle_two_payers_even_split() {
        let mut ledger = Ledger::new();
        let alice = ledger.add_participant("Alice").unwrap();
        let bob = ledger.add_participant("Bob").unwrap();
        ledger
            .add_order(NewOrder::new("Beer", dec("600"), 2, vec![alice, bob]))
            .unwrap();

        let settlement = settle(&ledger).unwrap();

        assert_eq!(settlement.grand_total, dec("1200"));
        assert_eq!(settlement.amount_for(alice), Some(dec("600")));
        assert_eq!(settlement.amount_for(bob), Some(dec("600")));
        assert_eq!(settlement.allocated_total(), dec("1200"));
    }

    #[test]
    fn test_settle_after_sole_payer_removed_is_empty() {
        let mut ledger = Ledger::new();
        let alice = ledger.add_participant("Alice").unwrap();
        ledger
            .add_order(NewOrder::new("Beer", dec("500"), 1, vec![alice]))
            .unwrap();

        ledger.remove_participant(alice);
        let settlement = settle(&ledger).unwrap();

        assert!(settlement.is_empty());
        assert_eq!(settlement.grand_total, Decimal::ZERO);
    }

    #[test]
    fn test_settle_redistributes_after_payer_removed() {
        let mut ledger = Ledger::new();
        let alice = ledger.add_participant("Alice").unwrap();
        let bob = ledger.add_participant("Bob").unwrap();
        let carol = ledger.add_participant("Carol").unwrap();
        ledger
            .add_order(NewOrder::new("Pitcher", dec("900"), 1, vec![alice, bob, carol]))
            .unwrap();
        assert_eq!(settle(&ledger).unwrap().amount_for(alice), Some(dec("300")));

        ledger.remove_participant(carol);
        let settlement = settle(&ledger).unwrap();

        assert_eq!(settlement.amount_for(alice), Some(dec("450")));
        assert_eq!(settlement.amount_for(bob), Some(dec("450")));
        assert_eq!(settlement.grand_total, dec("900"));
    }

    #[test]
    fn test_settle_includes_participants_without_orders() {
        let mut ledger = Ledger::new();
        let alice = ledger.add_participant("Alice").unwrap();
        let bob = ledger.add_participant("Bob").unwrap();
        ledger
            .add_order(NewOrder::new("Beer", dec("638"), 1, vec![alice]))
            .unwrap();

        let settlement = settle(&ledger).unwrap();

        assert_eq!(settlement.lines.len(), 2);
        assert_eq!(settlement.amount_for(bob), Some(Decimal::ZERO));
    }

    #[test]
    fn test_settle_sorts_by_amount_then_name() {
        let mut ledger = Ledger::new();
        let zoe = ledger.add_participant("zoe").unwrap();
        let bob = ledger.add_participant("Bob").unwrap();
        let amy = ledger.add_participant("amy").unwrap();
        ledger.add_participant("Carl").unwrap();
        ledger
            .add_order(NewOrder::new("Wine", dec("1000"), 1, vec![zoe, amy]))
            .unwrap();
        ledger
            .add_order(NewOrder::new("Tea", dec("319"), 1, vec![bob]))
            .unwrap();

        let settlement = settle(&ledger).unwrap();
        let names: Vec<&str> = settlement.lines.iter().map(|l| l.name.as_str()).collect();

        assert_eq!(names, vec!["amy", "zoe", "Bob", "Carl"]);
    }

    #[test]
    fn test_settle_three_way_split_is_exact() {
        let mut ledger = Ledger::new();
        let ids: Vec<ParticipantId> = ["Alice", "Bob", "Carol"]
            .iter()
            .map(|name| ledger.add_participant(name).unwrap())
            .collect();
        ledger
            .add_order(NewOrder::new("Sour", dec("100"), 1, ids.clone()))
            .unwrap();

        let settlement = settle(&ledger).unwrap();

        assert_eq!(settlement.amount_for(ids[0]), Some(dec("33.3334")));
        assert_eq!(settlement.amount_for(ids[1]), Some(dec("33.3333")));
        assert_eq!(settlement.amount_for(ids[2]), Some(dec("33.3333")));
        assert_eq!(settlement.allocated_total(), settlement.grand_total);
    }

    #[rstest]
    #[case::even(dec("1200"), 2, vec![dec("600"), dec("600")])]
    #[case::thirds(dec("100"), 3, vec![dec("33.3334"), dec("33.3333"), dec("33.3333")])]
    #[case::single(dec("539"), 1, vec![dec("539")])]
    #[case::tiny(dec("0.0001"), 3, vec![dec("0.0001"), dec("0"), dec("0")])]
    #[case::fine_scale(dec("1.000001"), 2, vec![dec("0.500001"), dec("0.5")])]
    #[case::none(dec("100"), 0, vec![])]
    fn test_split_evenly(
        #[case] total: Decimal,
        #[case] parts: usize,
        #[case] expected: Vec<Decimal>,
    ) {
        assert_eq!(split_evenly(total, parts).unwrap(), expected);
    }

    #[rstest]
    #[case::near_max(Decimal::MAX - Decimal::ONE, 3)]
    #[case::max(Decimal::MAX, 7)]
    #[case::max_scale(Decimal::from_i128_with_scale(MAX_MANTISSA, 28), 3)]
    #[case::coarse_large(dec("7922816251426433759354395033.5"), 4)]
    fn test_split_evenly_conserves_large_totals(#[case] total: Decimal, #[case] parts: usize) {
        let shares = split_evenly(total, parts).unwrap();
        let sum = shares
            .iter()
            .try_fold(Decimal::ZERO, |sum, share| sum.checked_add(*share));

        assert_eq!(shares.len(), parts);
        assert_eq!(sum, Some(total));
    }

    #[test]
    fn test_settle_large_order_is_exact() {
        let mut ledger = Ledger::new();
        let ids: Vec<ParticipantId> = ["Alice", "Bob", "Carol"]
            .iter()
            .map(|name| ledger.add_participant(name).unwrap())
            .collect();
        let price = dec("79228162514264337593543950334");
        ledger
            .add_order(NewOrder::new("Cellar", price, 1, ids.clone()))
            .unwrap();

        let settlement = settle(&ledger).unwrap();

        assert_eq!(settlement.grand_total, price);
        assert_eq!(
            settlement.amount_for(ids[0]),
            Some(dec("26409387504754779197847983445"))
        );
        assert_eq!(
            settlement.amount_for(ids[2]),
            Some(dec("26409387504754779197847983444"))
        );
    }

    #[test]
    fn test_settle_reports_lossy_grand_total() {
        let mut ledger = Ledger::new();
        let alice = ledger.add_participant("Alice").unwrap();
        let bob = ledger.add_participant("Bob").unwrap();
        ledger
            .add_order(NewOrder::new(
                "Cellar",
                dec("79228162514264337593543950000"),
                1,
                vec![alice],
            ))
            .unwrap();
        ledger
            .add_order(NewOrder::new("Tea", dec("0.0001"), 1, vec![bob]))
            .unwrap();

        assert!(matches!(
            settle(&ledger),
            Err(SplitError::ArithmeticOverflow { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: shares of an order always add up to the order total,
        /// at every scale and up to the largest representable amount.
        #[test]
        fn shares_sum_to_total(
            mantissa in 1i128..=MAX_MANTISSA,
            scale in 0u32..=28,
            parts in 1usize..12,
        ) {
            let total = Decimal::from_i128_with_scale(mantissa, scale);
            let shares = split_evenly(total, parts).unwrap();
            let sum = shares
                .iter()
                .try_fold(Decimal::ZERO, |sum, share| sum.checked_add(*share));
            prop_assert_eq!(shares.len(), parts);
            prop_assert_eq!(sum, Some(total));
        }

        /// Property: large or finely scaled prices either settle with every
        /// amount accounted for or fail with a typed overflow, never panic.
        #[test]
        fn settlement_balances_or_reports_overflow(
            orders in prop::collection::vec(
                (
                    1i128..=MAX_MANTISSA,
                    0u32..=28,
                    1u32..10,
                    prop::collection::vec(0usize..3, 1..4),
                ),
                1..6,
            )
        ) {
            let mut ledger = Ledger::new();
            let ids: Vec<ParticipantId> = ["Ann", "Ben", "Cho"]
                .iter()
                .map(|name| ledger.add_participant(name).unwrap())
                .collect();

            for (mantissa, scale, quantity, payer_indexes) in orders {
                let unit_price = Decimal::from_i128_with_scale(mantissa, scale);
                let payers = payer_indexes.iter().map(|index| ids[*index]).collect();
                match ledger.add_order(NewOrder::new("Drink", unit_price, quantity, payers)) {
                    Ok(_) => {}
                    Err(SplitError::InvalidOrder { reason: OrderRejection::TotalOverflow }) => {}
                    Err(other) => prop_assert!(false, "unexpected rejection: {}", other),
                }
            }

            match settle(&ledger) {
                Ok(settlement) => {
                    let allocated = settlement
                        .lines
                        .iter()
                        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.amount));
                    prop_assert_eq!(allocated, Some(settlement.grand_total));
                }
                Err(SplitError::ArithmeticOverflow { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        /// Property: for any set of orders the participant amounts add up to the
        /// grand total, which is the sum of unit price times quantity.
        #[test]
        fn settlement_conserves_total(
            orders in prop::collection::vec(
                (1i64..100_000i64, 1u32..10, prop::collection::vec(0usize..5, 1..5)),
                0..20,
            )
        ) {
            let mut ledger = Ledger::new();
            let ids: Vec<ParticipantId> = ["Ann", "Ben", "Cho", "Dai", "Eve"]
                .iter()
                .map(|name| ledger.add_participant(name).unwrap())
                .collect();

            let mut expected = Decimal::ZERO;
            for (price_cents, quantity, payer_indexes) in orders {
                let unit_price = Decimal::new(price_cents, 2);
                let payers = payer_indexes.iter().map(|index| ids[*index]).collect();
                ledger
                    .add_order(NewOrder::new("Drink", unit_price, quantity, payers))
                    .unwrap();
                expected += unit_price * Decimal::from(quantity);
            }

            let settlement = settle(&ledger).unwrap();
            prop_assert_eq!(settlement.grand_total, expected);
            prop_assert_eq!(settlement.allocated_total(), expected);
        }
    }
}
