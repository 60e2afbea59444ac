//! # Error Types
//!
//! Domain-specific error types for groupbuy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  groupbuy-core errors                                                   │
//! │  ├── CoreError        - Business rule violations (this file)           │
//! │  ├── ValidationError  - Input validation failures (this file)          │
//! │  ├── ProrataError     - Cost split refusals (prorata.rs)               │
//! │  └── MoneyParseError  - Malformed amounts (money.rs)                   │
//! │                                                                         │
//! │  groupbuy-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::MoneyParseError;
use crate::prorata::ProrataError;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The order no longer accepts wishes.
    ///
    /// ## When This Occurs
    /// - A member submits a wish against an order marked `completed`
    #[error("Order {order_id} is completed and no longer accepts wishes")]
    OrderClosed { order_id: String },

    /// A status change that the lifecycle does not allow.
    ///
    /// ## When This Occurs
    /// - Skipping a step (basket `draft` → `validated`)
    /// - Going backwards (order `completed` → `open`)
    #[error("{entity} {id} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    /// A wish cannot be placed in a basket.
    ///
    /// ## When This Occurs
    /// - The wish belongs to another order
    /// - The wish is not `submitted` any more
    /// - The wish is already in another basket
    #[error("Wish {wish_id} cannot be added to a basket: {reason}")]
    WishNotEligible { wish_id: String, reason: String },

    /// An edited wish does not belong to the basket being costed.
    #[error("Wish {wish_id} is not part of basket {basket_id}")]
    WishNotInBasket { wish_id: String, basket_id: String },

    /// The basket is past validation; its costs and wishes are frozen.
    #[error("Basket {basket_id} is {status} and can no longer be edited")]
    BasketLocked { basket_id: String, status: String },

    /// The basket cannot be validated until its costing is complete.
    ///
    /// ## When This Occurs
    /// - No costs were ever applied to the basket
    /// - A wish was refused after costing, so the remaining shares no longer
    ///   add up to the basket's shipping and customs costs
    #[error("Basket {basket_id} is not fully costed: {reason}")]
    BasketNotCosted { basket_id: String, reason: String },

    /// A basket edit must price every wish of the basket, no more, no less.
    #[error("Basket {basket_id} has {expected} wish(es) but the edit prices {got}")]
    IncompleteBasketEdit {
        basket_id: String,
        expected: usize,
        got: usize,
    },

    /// Cost split failed.
    #[error("Prorata error: {0}")]
    Prorata(#[from] ProrataError),

    /// An amount could not be parsed.
    #[error("Invalid amount: {0}")]
    Money(#[from] MoneyParseError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidTransition error from any displayable statuses.
    pub fn invalid_transition(
        entity: impl Into<String>,
        id: impl Into<String>,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        CoreError::InvalidTransition {
            entity: entity.into(),
            id: id.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs, one variant per kind of rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A date that must lie in the future does not.
    #[error("{field} must be in the future")]
    MustBeInFuture { field: String },

    /// A collection needs at least `min` entries.
    #[error("{field} must contain at least {min} item(s)")]
    TooFew { field: String, min: usize },

    /// A collection holds more than `max` entries.
    #[error("{field} must contain at most {max} item(s)")]
    TooMany { field: String, max: usize },

    /// The same value appears twice.
    #[error("{field} '{value}' is listed more than once")]
    Duplicate { field: String, value: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
