//! # groupbuy-core: Pure Business Logic for Group-Buy
//!
//! This crate contains the business logic of the group-buy tool as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Group-Buy Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ groupbuy-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  prorata  │  │  basket   │  │ validation│  │   │
//! │  │   │   Order   │  │  shares   │  │  costing  │  │   inputs  │  │   │
//! │  │   │   Wish    │  │  Money    │  │ amount due│  │  schemas  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  groupbuy-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, basket workflows             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`prorata`] - Shared-cost allocation with exact-sum correction
//! - [`basket`] - Shipping/customs costing of a basket's wishes
//! - [`types`] - Domain types (Order, Wish, Basket, statuses)
//! - [`validation`] - Input validation for orders, wishes and baskets
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use groupbuy_core::money::Money;
//! use groupbuy_core::prorata::{calculate_prorata_shares, ProrataItem};
//!
//! let items = vec![
//!     ProrataItem::new("a", Money::from_cents(3000)),
//!     ProrataItem::new("b", Money::from_cents(7000)),
//! ];
//!
//! let shares = calculate_prorata_shares(&items, Money::from_cents(1000)).unwrap();
//! assert_eq!(shares[0].share.cents(), 300);
//! assert_eq!(shares[1].share.cents(), 700);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod basket;
pub mod error;
pub mod money;
pub mod prorata;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use basket::{cost_basket, BasketCosting, WishCosting};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, MoneyParseError};
pub use prorata::{calculate_prorata_shares, ProrataError, ProrataItem, ProrataResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of the name given to a basket created without one.
///
/// The full default name is `"Panier - YYYY-MM-DD"`.
pub const DEFAULT_BASKET_NAME_PREFIX: &str = "Panier";

/// Maximum length of a game name on a wish.
pub const MAX_GAME_NAME_LEN: usize = 200;

/// Maximum length of a publisher catalogue reference.
pub const MAX_REFERENCE_LEN: usize = 100;

/// Maximum number of wishes batched into a single basket.
pub const MAX_BASKET_WISHES: usize = 500;
