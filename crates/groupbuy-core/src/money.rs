//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Splitting shipping three ways:                                         │
//! │    10.00 € / 3 = 3.33 € (×3 = 9.99 €)  → Lost 0.01 €!                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                         │
//! │    We KNOW we lost 1 cent, and the prorata module hands it back        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use groupbuy_core::money::Money;
//!
//! let price = Money::from_cents(3999); // 39.99 €
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 4499);
//!
//! // Amounts typed by an administrator are parsed, never converted from floats
//! let shipping: Money = "12.50".parse().unwrap();
//! assert_eq!(shipping.cents(), 1250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences between amounts (rounding residuals,
///   outstanding balances) can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde**: Serialized as the raw cent count
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Wish.unit_price ─────────────┬──► prorata weight                       │
/// │                               │                                         │
/// │  Basket.shipping_cost ────────┼──► Wish.shipping_share                  │
/// │  Basket.customs_cost ─────────┴──► Wish.customs_share                   │
/// │                                                                         │
/// │  unit_price + shipping_share + customs_share ──► Wish.amount_due        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use groupbuy_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99 €
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (euros and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50 €.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (euros) portion.
    #[inline]
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Errors raised when parsing a decimal amount such as `"12.50"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    /// The input was empty or only whitespace.
    #[error("amount is empty")]
    Empty,

    /// The input contains something other than digits and one separator.
    #[error("invalid amount '{0}'")]
    InvalidFormat(String),

    /// More than two digits after the decimal separator.
    #[error("amount '{0}' has more than 2 decimal places")]
    TooPrecise(String),

    /// The amount does not fit in an i64 cent count.
    #[error("amount '{0}' is out of range")]
    Overflow(String),
}

/// Parses `"12"`, `"12.5"`, `"12.50"`, `"-3.20"` or `"12,50"`.
///
/// ## Rules
/// - Optional leading `-`
/// - `.` or `,` as decimal separator
/// - At most 2 fractional digits, no rounding is ever applied
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (major, minor) = match unsigned.find(['.', ',']) {
            Some(idx) => (&unsigned[..idx], &unsigned[idx + 1..]),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if major.is_empty() || !all_digits(major) || !all_digits(minor) {
            return Err(MoneyParseError::InvalidFormat(input.to_string()));
        }
        if minor.len() > 2 {
            return Err(MoneyParseError::TooPrecise(input.to_string()));
        }

        let overflow = || MoneyParseError::Overflow(input.to_string());
        let major: i64 = major.parse().map_err(|_| overflow())?;
        // "5" after the separator means 50 cents
        let minor: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => minor.parse().map_err(|_| overflow())?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount the way members read it: `"12.34 €"`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} €",
            sign,
            self.euros().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Summing shares back up is how the exact-total invariant is checked.
impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.euros(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99 €");
        assert_eq!(Money::from_cents(500).to_string(), "5.00 €");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50 €");
        assert_eq!(Money::from_cents(0).to_string(), "0.00 €");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let mut c = a;
        c += b;
        c -= Money::from_cents(1);
        assert_eq!(c.cents(), 1499);
    }

    #[test]
    fn test_sum() {
        let shares = [
            Money::from_cents(333),
            Money::from_cents(333),
            Money::from_cents(334),
        ];
        let total: Money = shares.iter().sum();
        assert_eq!(total.cents(), 1000);

        let empty: Vec<Money> = Vec::new();
        assert!(empty.into_iter().sum::<Money>().is_zero());
    }

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!("12".parse::<Money>().unwrap().cents(), 1200);
        assert_eq!("12.5".parse::<Money>().unwrap().cents(), 1250);
        assert_eq!("12.50".parse::<Money>().unwrap().cents(), 1250);
        assert_eq!("12,05".parse::<Money>().unwrap().cents(), 1205);
        assert_eq!("0.01".parse::<Money>().unwrap().cents(), 1);
        assert_eq!(" 33.33 ".parse::<Money>().unwrap().cents(), 3333);
        assert_eq!("-3.20".parse::<Money>().unwrap().cents(), -320);
        assert_eq!("7.".parse::<Money>().unwrap().cents(), 700);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert!(matches!(
            "abc".parse::<Money>(),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            ".50".parse::<Money>(),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "1.2.3".parse::<Money>(),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "1.234".parse::<Money>(),
            Err(MoneyParseError::TooPrecise(_))
        ));
        assert!(matches!(
            "99999999999999999999".parse::<Money>(),
            Err(MoneyParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
        assert_eq!(Money::from_cents(-100).abs().cents(), 100);
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(1250)).unwrap();
        assert_eq!(json, "1250");
        let back: Money = serde_json::from_str("1250").unwrap();
        assert_eq!(back, Money::from_cents(1250));
    }
}
