//! # Domain Types
//!
//! Core domain types used throughout the group-buy tool.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐ 1   n ┌─────────────────┐ n   1 ┌───────────────┐ │
//! │  │     Order       │──────►│      Wish       │◄──────│    User       │ │
//! │  │  ─────────────  │       │  ─────────────  │       └───────────────┘ │
//! │  │  order_type     │       │  game_name      │                         │
//! │  │  target_date    │       │  unit_price     │ n   1 ┌───────────────┐ │
//! │  │  status         │       │  shipping_share │──────►│ DepositPoint  │ │
//! │  └────────┬────────┘       │  customs_share  │       └───────────────┘ │
//! │           │ 1              │  amount_due     │                         │
//! │           │                └────────┬────────┘                         │
//! │           │ n                       │ n                                │
//! │  ┌────────▼────────┐                │                                  │
//! │  │     Basket      │◄───────────────┘ 1                                │
//! │  │  shipping_cost  │                                                   │
//! │  │  customs_cost   │   costs are prorated onto the basket's wishes     │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Lifecycles
//! Every status enum exposes `can_transition_to`, the single source of truth
//! for which status changes the repositories accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Order Type
// =============================================================================

/// The kind of group-purchase campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// The regular monthly order.
    Monthly,
    /// A time-limited private sale.
    PrivateSale,
    /// A one-off purchase (pre-orders, crowdfunding pledges...).
    Special,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [OrderType::Monthly, OrderType::PrivateSale, OrderType::Special];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderType::Monthly => "monthly",
            OrderType::PrivateSale => "private_sale",
            OrderType::Special => "special",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order: `open → in_progress → completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Members may submit wishes.
    Open,
    /// Administrators are batching wishes into baskets.
    InProgress,
    /// Closed, no new wishes.
    Completed,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        }
    }

    /// Orders move forward one step at a time.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Open, OrderStatus::InProgress)
                | (OrderStatus::InProgress, OrderStatus::Completed)
        )
    }

    /// Whether members may still submit wishes.
    pub const fn accepts_wishes(&self) -> bool {
        !matches!(self, OrderStatus::Completed)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Wish Status
// =============================================================================

/// Lifecycle of a wish.
///
/// ```text
/// submitted ──► in_basket ──► validated ──► paid ──► picked_up
///     ▲             │
///     └─────────────┤ (removed from basket)
///                   └──► refused
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WishStatus {
    Submitted,
    InBasket,
    Validated,
    Refused,
    Paid,
    PickedUp,
}

impl WishStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            WishStatus::Submitted => "submitted",
            WishStatus::InBasket => "in_basket",
            WishStatus::Validated => "validated",
            WishStatus::Refused => "refused",
            WishStatus::Paid => "paid",
            WishStatus::PickedUp => "picked_up",
        }
    }

    pub const fn can_transition_to(&self, next: WishStatus) -> bool {
        matches!(
            (self, next),
            (WishStatus::Submitted, WishStatus::InBasket)
                | (WishStatus::InBasket, WishStatus::Submitted)
                | (WishStatus::InBasket, WishStatus::Validated)
                | (WishStatus::InBasket, WishStatus::Refused)
                | (WishStatus::Validated, WishStatus::Paid)
                | (WishStatus::Paid, WishStatus::PickedUp)
        )
    }
}

impl Default for WishStatus {
    fn default() -> Self {
        WishStatus::Submitted
    }
}

impl fmt::Display for WishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// How far along a member is in paying what they owe for a wish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Sent,
    Received,
    Partial,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Basket Status
// =============================================================================

/// Lifecycle of a shipping basket, strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BasketStatus {
    Draft,
    AwaitingValidation,
    Validated,
    AwaitingCustoms,
    AwaitingReception,
    AwaitingDelivery,
    AvailablePickup,
}

impl BasketStatus {
    /// All statuses in lifecycle order.
    pub const SEQUENCE: [BasketStatus; 7] = [
        BasketStatus::Draft,
        BasketStatus::AwaitingValidation,
        BasketStatus::Validated,
        BasketStatus::AwaitingCustoms,
        BasketStatus::AwaitingReception,
        BasketStatus::AwaitingDelivery,
        BasketStatus::AvailablePickup,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            BasketStatus::Draft => "draft",
            BasketStatus::AwaitingValidation => "awaiting_validation",
            BasketStatus::Validated => "validated",
            BasketStatus::AwaitingCustoms => "awaiting_customs",
            BasketStatus::AwaitingReception => "awaiting_reception",
            BasketStatus::AwaitingDelivery => "awaiting_delivery",
            BasketStatus::AvailablePickup => "available_pickup",
        }
    }

    /// The status that follows this one, `None` at the end of the lifecycle.
    pub fn next(&self) -> Option<BasketStatus> {
        let idx = Self::SEQUENCE.iter().position(|s| s == self)?;
        Self::SEQUENCE.get(idx + 1).copied()
    }

    pub fn can_transition_to(&self, next: BasketStatus) -> bool {
        self.next() == Some(next)
    }

    /// Costs may only be (re)applied before the basket is validated.
    pub const fn is_editable(&self) -> bool {
        matches!(self, BasketStatus::Draft | BasketStatus::AwaitingValidation)
    }
}

impl Default for BasketStatus {
    fn default() -> Self {
        BasketStatus::Draft
    }
}

impl fmt::Display for BasketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A periodic group-purchase campaign members submit wishes against.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_type: OrderType,
    /// Date the group purchase is placed with the publisher.
    #[ts(as = "String")]
    pub target_date: DateTime<Utc>,
    pub description: Option<String>,
    pub status: OrderStatus,
    /// User who opened the order.
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Wish
// =============================================================================

/// A single requested game, tied to a member and an order.
///
/// Money fields stay `None` until an administrator costs the wish's basket.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Wish {
    pub id: String,
    pub game_name: String,
    /// Catalogue reference at the publisher's shop.
    pub publisher_reference: String,
    pub publisher_url: Option<String>,
    pub status: WishStatus,
    pub unit_price_cents: Option<i64>,
    pub shipping_share_cents: Option<i64>,
    pub customs_share_cents: Option<i64>,
    /// unit price + shipping share + customs share.
    pub amount_due_cents: Option<i64>,
    pub payment_status: PaymentStatus,
    #[ts(as = "Option<String>")]
    pub payment_sent_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub payment_received_at: Option<DateTime<Utc>>,
    pub amount_paid_cents: Option<i64>,
    #[ts(as = "Option<String>")]
    pub picked_up_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub order_id: String,
    pub basket_id: Option<String>,
    pub deposit_point_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Wish {
    #[inline]
    pub fn unit_price(&self) -> Option<Money> {
        self.unit_price_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn shipping_share(&self) -> Option<Money> {
        self.shipping_share_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn customs_share(&self) -> Option<Money> {
        self.customs_share_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn amount_due(&self) -> Option<Money> {
        self.amount_due_cents.map(Money::from_cents)
    }

    /// What the member still owes, once the wish has been costed.
    pub fn outstanding(&self) -> Option<Money> {
        let paid = Money::from_cents(self.amount_paid_cents.unwrap_or(0));
        self.amount_due().map(|due| due - paid)
    }

    /// Whether the wish can be batched into a new basket.
    pub fn is_available_for_basket(&self) -> bool {
        self.status == WishStatus::Submitted && self.basket_id.is_none()
    }
}

// =============================================================================
// Basket
// =============================================================================

/// A shipment grouping of wishes within an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Basket {
    pub id: String,
    pub name: String,
    pub status: BasketStatus,
    pub shipping_cost_cents: Option<i64>,
    pub customs_cost_cents: Option<i64>,
    pub order_id: String,
    pub created_by: String,
    #[ts(as = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub available_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Basket {
    #[inline]
    pub fn shipping_cost(&self) -> Option<Money> {
        self.shipping_cost_cents.map(Money::from_cents)
    }

    #[inline]
    pub fn customs_cost(&self) -> Option<Money> {
        self.customs_cost_cents.map(Money::from_cents)
    }
}

/// A basket together with the wishes it batches.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BasketWithWishes {
    #[serde(flatten)]
    pub basket: Basket,
    pub wishes: Vec<Wish>,
}

// =============================================================================
// Deposit Point
// =============================================================================

/// A pickup location where members collect their games.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DepositPoint {
    pub id: String,
    pub name: String,
    pub address: String,
    pub is_default: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Users
// =============================================================================

/// A member of the group.
///
/// Accounts are managed by the authentication layer; only the fields the
/// group-buy workflows need are modelled here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// `Some("admin")` for administrators.
    pub role: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// The public view of a member, as listed to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wish() -> Wish {
        let now = Utc::now();
        Wish {
            id: "w-1".to_string(),
            game_name: "Cascadia".to_string(),
            publisher_reference: "REF-1".to_string(),
            publisher_url: None,
            status: WishStatus::Submitted,
            unit_price_cents: None,
            shipping_share_cents: None,
            customs_share_cents: None,
            amount_due_cents: None,
            payment_status: PaymentStatus::Pending,
            payment_sent_at: None,
            payment_received_at: None,
            amount_paid_cents: None,
            picked_up_at: None,
            user_id: "u-1".to_string(),
            order_id: "o-1".to_string(),
            basket_id: None,
            deposit_point_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Open));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Open));

        assert!(OrderStatus::InProgress.accepts_wishes());
        assert!(!OrderStatus::Completed.accepts_wishes());
    }

    #[test]
    fn test_wish_status_transitions() {
        assert!(WishStatus::Submitted.can_transition_to(WishStatus::InBasket));
        assert!(WishStatus::InBasket.can_transition_to(WishStatus::Submitted));
        assert!(WishStatus::InBasket.can_transition_to(WishStatus::Refused));
        assert!(WishStatus::Validated.can_transition_to(WishStatus::Paid));
        assert!(WishStatus::Paid.can_transition_to(WishStatus::PickedUp));

        assert!(!WishStatus::Submitted.can_transition_to(WishStatus::Paid));
        assert!(!WishStatus::Refused.can_transition_to(WishStatus::Validated));
        assert!(!WishStatus::PickedUp.can_transition_to(WishStatus::Submitted));
    }

    #[test]
    fn test_basket_status_sequence() {
        assert_eq!(BasketStatus::default(), BasketStatus::Draft);
        assert_eq!(
            BasketStatus::Draft.next(),
            Some(BasketStatus::AwaitingValidation)
        );
        assert_eq!(BasketStatus::AvailablePickup.next(), None);

        for pair in BasketStatus::SEQUENCE.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]));
            assert!(!pair[1].can_transition_to(pair[0]));
        }
        assert!(!BasketStatus::Draft.can_transition_to(BasketStatus::Validated));

        assert!(BasketStatus::AwaitingValidation.is_editable());
        assert!(!BasketStatus::Validated.is_editable());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&BasketStatus::AwaitingCustoms).unwrap(),
            "\"awaiting_customs\""
        );
        assert_eq!(
            serde_json::to_string(&OrderType::PrivateSale).unwrap(),
            "\"private_sale\""
        );
        assert_eq!(BasketStatus::AvailablePickup.to_string(), "available_pickup");
        assert_eq!(WishStatus::PickedUp.to_string(), "picked_up");
    }

    #[test]
    fn test_wish_money_accessors() {
        let mut w = wish();
        assert!(w.amount_due().is_none());
        assert!(w.outstanding().is_none());
        assert!(w.is_available_for_basket());

        w.unit_price_cents = Some(3999);
        w.shipping_share_cents = Some(250);
        w.customs_share_cents = Some(0);
        w.amount_due_cents = Some(4249);
        w.amount_paid_cents = Some(4000);

        assert_eq!(w.unit_price(), Some(Money::from_cents(3999)));
        assert_eq!(w.outstanding(), Some(Money::from_cents(249)));

        w.basket_id = Some("b-1".to_string());
        assert!(!w.is_available_for_basket());
    }

    #[test]
    fn test_user_summary() {
        let user = User {
            id: "u-1".to_string(),
            name: "Alex".to_string(),
            email: "alex@example.org".to_string(),
            role: Some("admin".to_string()),
            created_at: Utc::now(),
        };
        assert!(user.is_admin());

        let summary = UserSummary::from(user);
        assert_eq!(summary.email, "alex@example.org");
    }
}
