//! # Validation Module
//!
//! Input validation for the requests that create and edit orders, wishes
//! and baskets.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request deserialization (serde)                              │
//! │  └── Shape and types of the payload                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, URL format                              │
//! │  └── Positive costs and prices, future target dates                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repositories (groupbuy-db)                                   │
//! │  ├── Order still open, wishes eligible for the basket                  │
//! │  └── NOT NULL / FOREIGN KEY constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use groupbuy_core::validation::CreateBasketInput;
//!
//! let input = CreateBasketInput {
//!     order_id: "order-123".to_string(),
//!     name: None,
//!     wish_ids: vec!["wish-1".to_string(), "wish-2".to_string()],
//! };
//! assert!(input.validate().is_ok());
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::OrderType;
use crate::{DEFAULT_BASKET_NAME_PREFIX, MAX_BASKET_WISHES, MAX_GAME_NAME_LEN, MAX_REFERENCE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Checks that `value` is not blank and at most `max` characters long.
fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Checks that an identifier is present.
fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects the first identifier that appears twice.
fn validate_unique<'a>(field: &str, ids: impl IntoIterator<Item = &'a str>) -> ValidationResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::Duplicate {
                field: field.to_string(),
                value: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a link to the game's page on the publisher's shop.
///
/// ## Rules
/// - Must parse as an absolute URL
/// - Scheme must be `http` or `https`
///
/// ## Example
/// ```rust
/// use groupbuy_core::validation::validate_publisher_url;
///
/// assert!(validate_publisher_url("https://www.philibertnet.com/fr/42-cascadia.html").is_ok());
/// assert!(validate_publisher_url("not a url").is_err());
/// assert!(validate_publisher_url("ftp://example.org/game").is_err());
/// ```
pub fn validate_publisher_url(raw: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "publisher_url".to_string(),
        reason: reason.to_string(),
    };

    let parsed = url::Url::parse(raw.trim()).map_err(|_| invalid("must be a valid URL"))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(()),
        "http" | "https" => Err(invalid("must include a host")),
        _ => Err(invalid("must use http or https")),
    }
}

/// Validates an amount that must be strictly positive.
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Parses an order type from its wire name (`monthly`, `private_sale`,
/// `special`).
pub fn parse_order_type(raw: &str) -> ValidationResult<OrderType> {
    OrderType::ALL
        .into_iter()
        .find(|t| t.as_str() == raw.trim())
        .ok_or_else(|| ValidationError::NotAllowed {
            field: "order_type".to_string(),
            allowed: OrderType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
        })
}

/// Name given to a basket created without one: `"Panier - 2026-01-31"`.
pub fn default_basket_name(date: NaiveDate) -> String {
    format!("{} - {}", DEFAULT_BASKET_NAME_PREFIX, date.format("%Y-%m-%d"))
}

// =============================================================================
// Create Order
// =============================================================================

/// Request to open a new order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateOrderInput {
    pub order_type: OrderType,
    #[ts(as = "String")]
    pub target_date: DateTime<Utc>,
    pub description: Option<String>,
}

impl CreateOrderInput {
    /// ## Rules
    /// - `target_date` must be strictly after `now`
    pub fn validate(&self, now: DateTime<Utc>) -> ValidationResult<()> {
        if self.target_date <= now {
            return Err(ValidationError::MustBeInFuture {
                field: "target_date".to_string(),
            });
        }
        Ok(())
    }

    /// The description with blank values collapsed to `None`.
    pub fn normalized_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}

// =============================================================================
// Create Wish
// =============================================================================

/// Request from a member to add a game to an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateWishInput {
    pub order_id: String,
    pub game_name: String,
    pub publisher_reference: String,
    /// An empty string is treated as "no link".
    pub publisher_url: Option<String>,
}

impl CreateWishInput {
    /// ## Rules
    /// - `order_id` is required
    /// - `game_name` is required, at most 200 characters
    /// - `publisher_reference` is required, at most 100 characters
    /// - `publisher_url`, when non-empty, must be an http(s) URL
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("order_id", &self.order_id)?;
        validate_text("game_name", &self.game_name, MAX_GAME_NAME_LEN)?;
        validate_text(
            "publisher_reference",
            &self.publisher_reference,
            MAX_REFERENCE_LEN,
        )?;

        if let Some(url) = self.normalized_url() {
            validate_publisher_url(&url)?;
        }

        Ok(())
    }

    /// The URL with empty values collapsed to `None`.
    pub fn normalized_url(&self) -> Option<String> {
        self.publisher_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
    }
}

// =============================================================================
// Create Basket
// =============================================================================

/// Request from an administrator to batch wishes into a basket.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateBasketInput {
    pub order_id: String,
    pub name: Option<String>,
    pub wish_ids: Vec<String>,
}

impl CreateBasketInput {
    /// ## Rules
    /// - `order_id` is required
    /// - at least one wish, each id non-empty and listed once
    pub fn validate(&self) -> ValidationResult<()> {
        validate_id("order_id", &self.order_id)?;

        if self.wish_ids.is_empty() {
            return Err(ValidationError::TooFew {
                field: "wish_ids".to_string(),
                min: 1,
            });
        }
        if self.wish_ids.len() > MAX_BASKET_WISHES {
            return Err(ValidationError::TooMany {
                field: "wish_ids".to_string(),
                max: MAX_BASKET_WISHES,
            });
        }
        for id in &self.wish_ids {
            validate_id("wish_ids", id)?;
        }
        validate_unique("wish_ids", self.wish_ids.iter().map(String::as_str))
    }

    /// The requested name, or the dated default when none was given.
    pub fn name_or_default(&self, today: NaiveDate) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_basket_name(today))
    }
}

// =============================================================================
// Edit Basket
// =============================================================================

/// The price an administrator recorded for one wish of the basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EditBasketWish {
    pub id: String,
    pub unit_price: Money,
}

/// Request to record a basket's costs and its wishes' unit prices.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EditBasketInput {
    pub shipping_cost: Money,
    /// Customs are only known once the parcel clears; `None` until then.
    pub customs_cost: Option<Money>,
    pub wishes: Vec<EditBasketWish>,
}

impl EditBasketInput {
    /// ## Rules
    /// - `shipping_cost` must be positive
    /// - `customs_cost`, when present, must not be negative
    /// - at least one wish, ids listed once, each `unit_price` positive
    pub fn validate(&self) -> ValidationResult<()> {
        validate_positive_amount("shipping_cost", self.shipping_cost)?;

        if let Some(customs) = self.customs_cost {
            if customs.is_negative() {
                return Err(ValidationError::MustNotBeNegative {
                    field: "customs_cost".to_string(),
                });
            }
        }

        if self.wishes.is_empty() {
            return Err(ValidationError::TooFew {
                field: "wishes".to_string(),
                min: 1,
            });
        }

        for wish in &self.wishes {
            validate_id("wishes.id", &wish.id)?;
            validate_positive_amount("wishes.unit_price", wish.unit_price)?;
        }

        validate_unique("wishes.id", self.wishes.iter().map(|w| w.id.as_str()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn edit_input() -> EditBasketInput {
        EditBasketInput {
            shipping_cost: Money::from_cents(2550),
            customs_cost: None,
            wishes: vec![
                EditBasketWish {
                    id: "wish-1".to_string(),
                    unit_price: Money::from_cents(3000),
                },
                EditBasketWish {
                    id: "wish-2".to_string(),
                    unit_price: Money::from_cents(4500),
                },
            ],
        }
    }

    fn wish_input(url: Option<&str>) -> CreateWishInput {
        CreateWishInput {
            order_id: "order-123".to_string(),
            game_name: "Cascadia".to_string(),
            publisher_reference: "PHI-12345".to_string(),
            publisher_url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_create_order_target_date_must_be_future() {
        let now = Utc::now();
        let mut input = CreateOrderInput {
            order_type: OrderType::Monthly,
            target_date: now + Duration::days(7),
            description: Some("  ".to_string()),
        };
        assert!(input.validate(now).is_ok());
        assert_eq!(input.normalized_description(), None);

        input.target_date = now;
        assert_eq!(
            input.validate(now),
            Err(ValidationError::MustBeInFuture {
                field: "target_date".to_string()
            })
        );

        input.target_date = now - Duration::days(1);
        assert!(input.validate(now).is_err());
    }

    #[test]
    fn test_parse_order_type() {
        assert_eq!(parse_order_type("monthly").unwrap(), OrderType::Monthly);
        assert_eq!(parse_order_type("private_sale").unwrap(), OrderType::PrivateSale);
        assert_eq!(parse_order_type("special").unwrap(), OrderType::Special);
        assert!(matches!(
            parse_order_type("weekly"),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_create_wish() {
        assert!(wish_input(None).validate().is_ok());
        assert!(wish_input(Some("")).validate().is_ok());
        assert_eq!(wish_input(Some("")).normalized_url(), None);
        assert!(wish_input(Some("https://www.philibertnet.com/fr/1-game.html"))
            .validate()
            .is_ok());
        assert!(wish_input(Some("pas une url")).validate().is_err());

        let mut input = wish_input(None);
        input.game_name = "   ".to_string();
        assert_eq!(
            input.validate(),
            Err(ValidationError::Required {
                field: "game_name".to_string()
            })
        );

        let mut input = wish_input(None);
        input.publisher_reference = String::new();
        assert!(input.validate().is_err());

        let mut input = wish_input(None);
        input.game_name = "A".repeat(MAX_GAME_NAME_LEN + 1);
        assert!(matches!(
            input.validate(),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_publisher_url_rules() {
        assert!(validate_publisher_url("http://example.org/game").is_ok());
        assert!(validate_publisher_url("mailto:someone@example.org").is_err());
        assert!(validate_publisher_url("/relative/path").is_err());
    }

    #[test]
    fn test_create_basket() {
        let mut input = CreateBasketInput {
            order_id: "order-123".to_string(),
            name: Some("Panier janvier".to_string()),
            wish_ids: vec!["wish-1".to_string()],
        };
        assert!(input.validate().is_ok());

        input.wish_ids.clear();
        assert_eq!(
            input.validate(),
            Err(ValidationError::TooFew {
                field: "wish_ids".to_string(),
                min: 1
            })
        );

        input.wish_ids = vec!["wish-1".to_string(), "wish-1".to_string()];
        assert!(matches!(
            input.validate(),
            Err(ValidationError::Duplicate { .. })
        ));

        input.wish_ids = (0..=MAX_BASKET_WISHES).map(|i| format!("wish-{i}")).collect();
        assert_eq!(
            input.validate(),
            Err(ValidationError::TooMany {
                field: "wish_ids".to_string(),
                max: MAX_BASKET_WISHES
            })
        );
        input.wish_ids.pop();
        assert!(input.validate().is_ok());

        input.wish_ids = vec!["wish-1".to_string()];
        input.order_id = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_basket_name_defaults_to_date() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let mut input = CreateBasketInput {
            order_id: "order-123".to_string(),
            name: None,
            wish_ids: vec!["wish-1".to_string()],
        };
        assert_eq!(input.name_or_default(today), "Panier - 2026-01-31");

        input.name = Some(" ".to_string());
        assert_eq!(input.name_or_default(today), "Panier - 2026-01-31");

        input.name = Some("Panier janvier".to_string());
        assert_eq!(input.name_or_default(today), "Panier janvier");
    }

    #[test]
    fn test_edit_basket() {
        assert!(edit_input().validate().is_ok());

        let mut input = edit_input();
        input.shipping_cost = Money::from_cents(-500);
        assert_eq!(
            input.validate(),
            Err(ValidationError::MustBePositive {
                field: "shipping_cost".to_string()
            })
        );

        let mut input = edit_input();
        input.shipping_cost = Money::zero();
        assert!(input.validate().is_err());

        let mut input = edit_input();
        input.wishes[1].unit_price = Money::from_cents(-100);
        assert!(input.validate().is_err());

        let mut input = edit_input();
        input.customs_cost = Some(Money::zero());
        assert!(input.validate().is_ok());
        input.customs_cost = Some(Money::from_cents(-1));
        assert!(input.validate().is_err());

        let mut input = edit_input();
        input.wishes.clear();
        assert!(input.validate().is_err());

        let mut input = edit_input();
        input.wishes[1].id = "wish-1".to_string();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::Duplicate { .. })
        ));
    }
}
