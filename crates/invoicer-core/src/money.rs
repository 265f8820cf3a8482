//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An invoice total computed that way drifts from the sum a customer     │
//! │  adds up by hand on the printed lines.                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "25.50" is parsed straight into 2550 cents, never through f64       │
//! │    2 × 2550 + 10000 = 15100 cents = "151.00", exactly                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use invoicer_core::money::Money;
//!
//! let price: Money = "25.50".parse().unwrap();
//! assert_eq!(price.cents(), 2550);
//!
//! let line = price.checked_mul_quantity(2).unwrap();
//! assert_eq!(line.to_string(), "51.00");
//! ```
//!
//! ## Wire Format
//! Money serializes as a decimal string with exactly two places (`"151.00"`).
//! It deserializes from a decimal string or a JSON number.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Largest amount accepted anywhere in an invoice: 99,999,999.99.
///
/// Ten significant digits with two decimal places. Unit prices, line amounts
/// and invoice totals are all checked against it, which also keeps every
/// multiplication and sum far away from `i64` overflow.
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: parsing keeps the sign so validation can report
///   "must be positive" instead of a format error
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Decimal string on the wire**: matches how callers write prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use invoicer_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
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

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value fits the ten-digit amount limit.
    #[inline]
    pub const fn within_limit(&self) -> bool {
        self.0.abs() <= MAX_AMOUNT_CENTS
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    ///
    /// ```rust
    /// use invoicer_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_mul_quantity(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Errors produced when a decimal string cannot become `Money`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a valid decimal number")]
    InvalidFormat(String),

    /// More than two digits after the decimal point.
    #[error("'{0}' has more than 2 decimal places")]
    TooManyDecimals(String),

    #[error("'{0}' is too large")]
    OutOfRange(String),
}

/// Parses `"25.50"`, `"25.5"`, `"25"`, `"-5.00"` and `".5"`.
///
/// Exponents, thousands separators and more than two decimal places are
/// rejected; nothing is rounded.
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, unsigned) = match raw.as_bytes()[0] {
            b'-' => (true, &raw[1..]),
            b'+' => (false, &raw[1..]),
            _ => (false, raw),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(MoneyParseError::InvalidFormat(raw.to_string()));
        }

        if frac_part.len() > 2 {
            return Err(MoneyParseError::TooManyDecimals(raw.to_string()));
        }

        let out_of_range = || MoneyParseError::OutOfRange(raw.to_string());

        let mut cents: i64 = 0;
        for digit in int_part.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or_else(out_of_range)?;
        }

        let mut frac_digits = frac_part.bytes().map(|d| i64::from(d - b'0'));
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);

        cents = cents
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths))
            .ok_or_else(out_of_range)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal with two places, no currency symbol: `151.00`, `-5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most 2 decimal places")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom(MoneyParseError::OutOfRange(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom(MoneyParseError::OutOfRange(v.to_string())))
            .and_then(|v| self.visit_i64(v))
    }

    // JSON numbers like 25.5 go through their shortest decimal rendering,
    // so 0.1 stays "0.1" rather than the binary expansion.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if !v.is_finite() {
            return Err(E::custom(MoneyParseError::InvalidFormat(v.to_string())));
        }
        v.to_string().parse().map_err(E::custom)
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(15100).to_string(), "151.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!("25.50".parse::<Money>().unwrap().cents(), 2550);
        assert_eq!("25.5".parse::<Money>().unwrap().cents(), 2550);
        assert_eq!("25".parse::<Money>().unwrap().cents(), 2500);
        assert_eq!(".5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("7.".parse::<Money>().unwrap().cents(), 700);
        assert_eq!(" 100.00 ".parse::<Money>().unwrap().cents(), 10000);
        assert_eq!("-5.00".parse::<Money>().unwrap().cents(), -500);
        assert_eq!("+3.10".parse::<Money>().unwrap().cents(), 310);
        assert_eq!("0".parse::<Money>().unwrap(), Money::zero());
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!("".parse::<Money>(), Err(MoneyParseError::Empty));
        assert!(matches!(".".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("abc".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("1e3".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("1,000.00".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("--1".parse::<Money>(), Err(MoneyParseError::InvalidFormat(_))));
        assert!(matches!("1.234".parse::<Money>(), Err(MoneyParseError::TooManyDecimals(_))));
        assert!(matches!(
            "99999999999999999999".parse::<Money>(),
            Err(MoneyParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_as_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(15100)).unwrap();
        assert_eq!(json, "\"151.00\"");

        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cents(), 15100);
    }

    #[test]
    fn test_deserialize_from_numbers() {
        assert_eq!(serde_json::from_str::<Money>("25.5").unwrap().cents(), 2550);
        assert_eq!(serde_json::from_str::<Money>("0.1").unwrap().cents(), 10);
        assert_eq!(serde_json::from_str::<Money>("100").unwrap().cents(), 10000);
        assert_eq!(serde_json::from_str::<Money>("-5").unwrap().cents(), -500);
        assert!(serde_json::from_str::<Money>("1.005").is_err());
        assert!(serde_json::from_str::<Money>("\"1.005\"").is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let unit_price = Money::from_cents(2550);
        assert_eq!(unit_price.checked_mul_quantity(2), Some(Money::from_cents(5100)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_limit() {
        assert!(Money::from_cents(MAX_AMOUNT_CENTS).within_limit());
        assert!(!Money::from_cents(MAX_AMOUNT_CENTS + 1).within_limit());
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(10000), Money::from_cents(5100)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.to_string(), "151.00");
    }

    /// 0.1 + 0.2 is exactly 0.3 in cents.
    #[test]
    fn test_no_float_drift() {
        let a: Money = "0.1".parse().unwrap();
        let b: Money = "0.2".parse().unwrap();
        assert_eq!(a + b, "0.3".parse::<Money>().unwrap());
    }
}
