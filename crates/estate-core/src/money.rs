//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  For a flat priced ₹45,00,001 the 50% sold threshold is ₹22,50,000.50. │
//! │  Comparing floats at that boundary can flip a booking to "sold" a      │
//! │  paisa early or a paisa late.                                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    1 rupee = 100 paise, stored as i64                                  │
//! │    Threshold checks use i128 cross-multiplication, never division      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The backend speaks rupees as plain JSON numbers (`"amount": 50000`). The
//! conversion to and from paise happens only inside the serde impls below,
//! rounded to the nearest paisa.
//!
//! ## Usage
//! ```rust
//! use estate_core::money::Money;
//!
//! let booking_amount = Money::from_rupees(50_000);
//! let installment: Money = "12500.50".parse().unwrap();
//!
//! let paid = booking_amount + installment;
//! assert_eq!(paid.paise(), 6_250_050);
//! assert_eq!(paid.to_string(), "₹62,500.50");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Paise per rupee.
const PAISE_PER_RUPEE: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in paise (the smallest rupee unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: sums of payments never approach the limit, and a
///   signed type lets validation reject negative input instead of wrapping
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Custom serde**: rupees on the wire, paise in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use estate_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(1_500).paise(), 150_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * PAISE_PER_RUPEE)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / PAISE_PER_RUPEE
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % PAISE_PER_RUPEE).abs()
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

    /// Returns the amount still owed against `total`, floored at zero.
    ///
    /// ## Example
    /// ```rust
    /// use estate_core::money::Money;
    ///
    /// let total = Money::from_rupees(200_000);
    /// assert_eq!(Money::from_rupees(50_000).remaining_of(total), Money::from_rupees(150_000));
    /// assert_eq!(Money::from_rupees(250_000).remaining_of(total), Money::zero());
    /// ```
    #[inline]
    pub fn remaining_of(&self, total: Money) -> Money {
        Money(total.0.saturating_sub(self.0).max(0))
    }

    /// Adds two amounts, returning `None` on overflow.
    ///
    /// Sums that mix server-reported totals with operator input go through
    /// here, not `+`.
    ///
    /// ## Example
    /// ```rust
    /// use estate_core::money::Money;
    ///
    /// let paid = Money::from_rupees(50_000);
    /// assert_eq!(paid.checked_add(Money::from_rupees(1)), Some(Money::from_rupees(50_001)));
    /// assert_eq!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Rupees as a float. For the wire only, never for arithmetic.
    fn as_rupees_f64(&self) -> f64 {
        self.0 as f64 / PAISE_PER_RUPEE as f64
    }

    /// Rounds a rupee float from the wire to the nearest paisa.
    fn from_rupees_f64(rupees: f64) -> Option<Self> {
        if !rupees.is_finite() {
            return None;
        }
        let paise = (rupees * PAISE_PER_RUPEE as f64).round();
        if paise.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(paise as i64))
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Failure to parse a typed rupee amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("at most two decimal places are allowed")]
    TooPrecise,

    #[error("amount is too large")]
    Overflow,
}

/// Parses an operator-typed rupee amount exactly.
///
/// Accepts an optional leading sign, digits, optional `,` group separators
/// and at most two decimals: `"1500"`, `"1,50,000"`, `"1500.5"`, `"-20"`.
impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, body) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let cleaned: String = body.chars().filter(|c| *c != ',').collect();
        let (whole, fraction) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(ParseMoneyError::NotNumeric(s.to_string()));
        }
        if fraction.len() > 2 {
            return Err(ParseMoneyError::TooPrecise);
        }

        let rupees: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ParseMoneyError::Overflow)?
        };
        let paise: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| ParseMoneyError::Overflow)? * 10,
            _ => fraction.parse().map_err(|_| ParseMoneyError::Overflow)?,
        };

        let total = rupees
            .checked_mul(PAISE_PER_RUPEE)
            .and_then(|p| p.checked_add(paise))
            .ok_or(ParseMoneyError::Overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses Indian digit grouping: `₹1,50,000.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.rupees().unsigned_abs().to_string();

        let grouped = if digits.len() <= 3 {
            digits
        } else {
            let (head, last_three) = digits.split_at(digits.len() - 3);
            let mut groups: Vec<&str> = Vec::new();
            let mut end = head.len();
            while end > 2 {
                groups.push(&head[end - 2..end]);
                end -= 2;
            }
            groups.push(&head[..end]);
            groups.reverse();
            format!("{},{}", groups.join(","), last_three)
        };

        write!(f, "{}₹{}.{:02}", sign, grouped, self.paise_part())
    }
}

/// Default money is zero.
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Serde (rupees on the wire)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.paise_part() == 0 {
            serializer.serialize_i64(self.rupees())
        } else {
            serializer.serialize_f64(self.as_rupees_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RupeeVisitor;

        impl Visitor<'_> for RupeeVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a rupee amount as a number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                v.checked_mul(PAISE_PER_RUPEE)
                    .map(Money)
                    .ok_or_else(|| E::custom("rupee amount out of range"))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map_err(|_| E::custom("rupee amount out of range"))
                    .and_then(|v| self.visit_i64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::from_rupees_f64(v).ok_or_else(|| E::custom("rupee amount out of range"))
            }

            // Some backend handlers echo form input back as strings.
            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(RupeeVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupees() {
        let money = Money::from_rupees(1_500);
        assert_eq!(money.paise(), 150_000);
        assert_eq!(money.rupees(), 1_500);
        assert_eq!(money.paise_part(), 0);
    }

    #[test]
    fn test_display_indian_grouping() {
        assert_eq!(Money::from_rupees(0).to_string(), "₹0.00");
        assert_eq!(Money::from_rupees(999).to_string(), "₹999.00");
        assert_eq!(Money::from_rupees(1_000).to_string(), "₹1,000.00");
        assert_eq!(Money::from_rupees(150_000).to_string(), "₹1,50,000.00");
        assert_eq!(Money::from_rupees(12_345_678).to_string(), "₹1,23,45,678.00");
        assert_eq!(Money::from_paise(-5_050).to_string(), "-₹50.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!("1500".parse::<Money>().unwrap(), Money::from_rupees(1_500));
        assert_eq!("1,50,000".parse::<Money>().unwrap(), Money::from_rupees(150_000));
        assert_eq!("12.5".parse::<Money>().unwrap(), Money::from_paise(1_250));
        assert_eq!(" 0.05 ".parse::<Money>().unwrap(), Money::from_paise(5));
        assert_eq!("-20".parse::<Money>().unwrap(), Money::from_rupees(-20));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Money>(), Err(ParseMoneyError::Empty));
        assert!(matches!("abc".parse::<Money>(), Err(ParseMoneyError::NotNumeric(_))));
        assert!(matches!("12a".parse::<Money>(), Err(ParseMoneyError::NotNumeric(_))));
        assert!(matches!(".".parse::<Money>(), Err(ParseMoneyError::NotNumeric(_))));
        assert!(matches!("1e5".parse::<Money>(), Err(ParseMoneyError::NotNumeric(_))));
        assert_eq!("1.005".parse::<Money>(), Err(ParseMoneyError::TooPrecise));
        assert_eq!(
            "99999999999999999999".parse::<Money>(),
            Err(ParseMoneyError::Overflow)
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupees(1_000);
        let b = Money::from_rupees(500);

        assert_eq!(a + b, Money::from_rupees(1_500));
        assert_eq!(a - b, Money::from_rupees(500));

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_rupees(2_000));
    }

    #[test]
    fn test_checked_add_and_remaining_at_the_limits() {
        let near_max = Money::from_paise(i64::MAX - 10);
        let max = Money::from_paise(i64::MAX);
        assert_eq!(near_max.checked_add(Money::from_paise(10)), Some(max));
        assert_eq!(near_max.checked_add(Money::from_rupees(1)), None);

        assert_eq!(Money::from_paise(i64::MIN).remaining_of(max), max);
    }

    #[test]
    fn test_serde_uses_rupees() {
        assert_eq!(serde_json::to_string(&Money::from_rupees(50_000)).unwrap(), "50000");
        assert_eq!(serde_json::to_string(&Money::from_paise(1_250)).unwrap(), "12.5");

        let whole: Money = serde_json::from_str("200000").unwrap();
        assert_eq!(whole, Money::from_rupees(200_000));

        let fractional: Money = serde_json::from_str("1499.99").unwrap();
        assert_eq!(fractional, Money::from_paise(149_999));

        let quoted: Money = serde_json::from_str("\"750\"").unwrap();
        assert_eq!(quoted, Money::from_rupees(750));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_paise(1).is_positive());
        assert!(Money::from_paise(-1).is_negative());
    }
}
