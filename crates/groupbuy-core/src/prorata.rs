//! # Prorata Module
//!
//! Distributes a shared cost (shipping, customs) across the wishes of a
//! basket in proportion to their unit price.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shipping 10.00 € over three games                                      │
//! │                                                                         │
//! │  unit price   weight        raw share       rounded                     │
//! │  ──────────   ──────        ─────────       ───────                     │
//! │  a  33.33 €   33.33/100     3.333 €         3.33 €                      │
//! │  b  33.33 €   33.33/100     3.333 €         3.33 €                      │
//! │  c  33.34 €   33.34/100     3.334 €         3.33 €  + 0.01 € residual   │
//! │                                                                         │
//! │  Σ rounded = 9.99 €  →  diff = 0.01 €  →  added to the LAST item        │
//! │  Σ shares  = 10.00 € exactly                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every share is rounded to the cent independently (half away from zero)
//! before the residual is computed. The residual always lands on the last
//! element of the input, whatever its weight.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Types
// =============================================================================

/// A weighted item taking part in a cost split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProrataItem {
    /// Identifier echoed back on the matching result (usually a wish id).
    pub id: String,
    /// Weight of the item in the split.
    pub unit_price: Money,
}

impl ProrataItem {
    pub fn new(id: impl Into<String>, unit_price: Money) -> Self {
        ProrataItem {
            id: id.into(),
            unit_price,
        }
    }
}

/// The share of the total cost assigned to one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProrataResult {
    pub id: String,
    pub share: Money,
}

/// Inputs the allocator refuses to split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProrataError {
    /// There is nothing to split the cost across.
    #[error("cannot split a cost across zero items")]
    NoItems,

    /// Weights must be zero or positive.
    #[error("unit price of item {id} is negative")]
    NegativeUnitPrice { id: String },

    /// Only non-negative costs are shared.
    #[error("total cost {0} is negative")]
    NegativeTotalCost(Money),
}

// =============================================================================
// Allocation
// =============================================================================

/// Splits `total_cost` across `items` proportionally to their unit price.
///
/// ## Guarantees
/// - One result per item, in input order
/// - `Σ share == total_cost`, to the cent
/// - Every share except the last is the exact ratio rounded to the cent
///
/// ## Zero Total Weight
/// When every unit price is zero the items carry the same weight and the
/// cost is split evenly, the residual again landing on the last item.
///
/// ## Example
/// ```rust
/// use groupbuy_core::money::Money;
/// use groupbuy_core::prorata::{calculate_prorata_shares, ProrataItem};
///
/// let items = vec![
///     ProrataItem::new("a", Money::from_cents(3333)),
///     ProrataItem::new("b", Money::from_cents(3333)),
///     ProrataItem::new("c", Money::from_cents(3334)),
/// ];
/// let shares = calculate_prorata_shares(&items, Money::from_cents(1000)).unwrap();
///
/// let cents: Vec<i64> = shares.iter().map(|r| r.share.cents()).collect();
/// assert_eq!(cents, vec![333, 333, 334]);
/// ```
pub fn calculate_prorata_shares(
    items: &[ProrataItem],
    total_cost: Money,
) -> Result<Vec<ProrataResult>, ProrataError> {
    if items.is_empty() {
        return Err(ProrataError::NoItems);
    }
    if total_cost.is_negative() {
        return Err(ProrataError::NegativeTotalCost(total_cost));
    }
    if let Some(item) = items.iter().find(|item| item.unit_price.is_negative()) {
        return Err(ProrataError::NegativeUnitPrice {
            id: item.id.clone(),
        });
    }

    let total_price: i128 = items.iter().map(|i| i128::from(i.unit_price.cents())).sum();
    let weight_of = |item: &ProrataItem| -> i128 {
        if total_price == 0 {
            1
        } else {
            i128::from(item.unit_price.cents())
        }
    };
    let total_weight = if total_price == 0 {
        items.len() as i128
    } else {
        total_price
    };

    let total = i128::from(total_cost.cents());
    let mut shares: Vec<i128> = items
        .iter()
        .map(|item| round_half_away(weight_of(item) * total, total_weight))
        .collect();

    let allocated: i128 = shares.iter().sum();
    let diff = total - allocated;
    if let Some(last) = shares.last_mut() {
        *last += diff;
    }

    // Each share is bounded by total_cost (plus at most half a cent per item
    // before correction), so it fits back into i64
    Ok(items
        .iter()
        .zip(shares)
        .map(|(item, share)| ProrataResult {
            id: item.id.clone(),
            share: Money::from_cents(share as i64),
        })
        .collect())
}

/// `numerator / denominator` rounded to the nearest integer, ties away from
/// zero. `denominator` must be positive and `numerator` non-negative.
fn round_half_away(numerator: i128, denominator: i128) -> i128 {
    (2 * numerator + denominator) / (2 * denominator)
}

// =============================================================================
// Unit Tests
// =============================================================================
