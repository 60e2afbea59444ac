//! # Basket Costing
//!
//! Turns an administrator's basket edit (shipping cost, optional customs
//! cost, unit price per wish) into what each wish owes.
//!
//! ## Workflow
//! ```text
//! EditBasketInput { shipping 25.50 €, customs none, wishes [30 €, 45 €] }
//!      │
//!      ▼
//! cost_basket() ← THIS MODULE
//!      │  prorata(shipping) → [10.20 €, 15.30 €]
//!      │  prorata(customs)  → [0 €, 0 €]
//!      ▼
//! WishCosting { unit 30 €, shipping 10.20 €, customs 0 €, due 40.20 € }
//! WishCosting { unit 45 €, shipping 15.30 €, customs 0 €, due 60.30 € }
//!      │
//!      ▼
//! groupbuy-db persists the shares on the wish rows
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::prorata::{calculate_prorata_shares, ProrataItem};
use crate::validation::EditBasketInput;

/// The computed money fields of one wish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WishCosting {
    pub wish_id: String,
    pub unit_price: Money,
    pub shipping_share: Money,
    pub customs_share: Money,
    /// `unit_price + shipping_share + customs_share`.
    pub amount_due: Money,
}

/// The costing of a whole basket, wishes in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BasketCosting {
    pub shipping_cost: Money,
    pub customs_cost: Option<Money>,
    pub wishes: Vec<WishCosting>,
}

impl BasketCosting {
    /// Sum of all unit prices.
    pub fn goods_total(&self) -> Money {
        self.wishes.iter().map(|w| w.unit_price).sum()
    }

    /// Sum of every wish's amount due: goods plus shared costs.
    pub fn grand_total(&self) -> Money {
        self.wishes.iter().map(|w| w.amount_due).sum()
    }
}

/// Validates `input` and prorates its shipping and customs costs over the
/// wishes by unit price.
///
/// Without a customs cost every customs share is zero.
///
/// ## Example
/// ```rust
/// use groupbuy_core::basket::cost_basket;
/// use groupbuy_core::money::Money;
/// use groupbuy_core::validation::{EditBasketInput, EditBasketWish};
///
/// let input = EditBasketInput {
///     shipping_cost: Money::from_cents(1000),
///     customs_cost: None,
///     wishes: vec![
///         EditBasketWish { id: "a".into(), unit_price: Money::from_cents(3000) },
///         EditBasketWish { id: "b".into(), unit_price: Money::from_cents(7000) },
///     ],
/// };
///
/// let costing = cost_basket(&input).unwrap();
/// assert_eq!(costing.wishes[0].amount_due.cents(), 3300);
/// assert_eq!(costing.wishes[1].amount_due.cents(), 7700);
/// ```
pub fn cost_basket(input: &EditBasketInput) -> CoreResult<BasketCosting> {
    input.validate()?;

    let items: Vec<ProrataItem> = input
        .wishes
        .iter()
        .map(|w| ProrataItem::new(w.id.clone(), w.unit_price))
        .collect();

    let shipping = calculate_prorata_shares(&items, input.shipping_cost)?;
    let customs = calculate_prorata_shares(&items, input.customs_cost.unwrap_or_default())?;

    let wishes = input
        .wishes
        .iter()
        .zip(shipping.into_iter().zip(customs))
        .map(|(wish, (shipping, customs))| WishCosting {
            wish_id: wish.id.clone(),
            unit_price: wish.unit_price,
            shipping_share: shipping.share,
            customs_share: customs.share,
            amount_due: wish.unit_price + shipping.share + customs.share,
        })
        .collect();

    Ok(BasketCosting {
        shipping_cost: input.shipping_cost,
        customs_cost: input.customs_cost,
        wishes,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
