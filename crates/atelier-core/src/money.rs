//! # Money Module
//!
//! Integer minor-unit money for every price, line total and payment.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount is stored as whole minor units (cents, paisa, ...)       │
//! │                                                                         │
//! │    Rs. 2,499.00  →  Money(249900)                                      │
//! │    10% of 999    →  99.9 → rounds half up → Money(100)                 │
//! │    overflow      →  checked_* returns None, operators saturate         │
//! │                                                                         │
//! │  The API, the database and the cart all speak minor units. Only the    │
//! │  receipt renderer turns them into "Rs. 2499.00".                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atelier_core::money::Money;
//!
//! let price = Money::from_cents(249900);
//! let line = price * 2;
//! assert_eq!(line.cents(), 499800);
//! assert_eq!(line.to_string(), "4998.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// Percentage points in one whole.
pub const PERCENT_SCALE: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so intermediate differences (paid minus total) can be inspected
/// before they are clamped; persisted amounts are never negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole and fractional units.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(2499, 50).cents(), 249950);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        Money(major * 100 + minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `percent / 100` of this amount, rounded half up to the
    /// nearest minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// // 10% of 9.99 is 0.999, which rounds to 1.00
    /// assert_eq!(Money::from_cents(999).percentage(10).cents(), 100);
    /// // 15% of 0.03 is 0.0045, which rounds to 0.00
    /// assert_eq!(Money::from_cents(3).percentage(15).cents(), 0);
    /// ```
    pub fn percentage(&self, percent: i64) -> Money {
        // i128 keeps large subtotals from overflowing during the multiply
        let scaled = self.0 as i128 * percent as i128;
        let half = PERCENT_SCALE as i128 / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / PERCENT_SCALE as i128
        } else {
            (scaled - half) / PERCENT_SCALE as i128
        };
        let clamped = rounded.clamp(i64::MIN as i128, i64::MAX as i128);
        Money(clamped as i64)
    }

    /// Subtracts `other`, flooring the result at zero.
    #[inline]
    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Adds `other`, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use atelier_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1).checked_add(Money::from_cents(2)), Some(Money::from_cents(3)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies by a quantity, or `None` on overflow.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Formats with a leading currency symbol, e.g. `Rs. 2499.00`.
    pub fn format_with(&self, symbol: &str) -> String {
        if symbol.is_empty() {
            self.to_string()
        } else {
            format!("{} {}", symbol, self)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
//
// The operators saturate instead of overflowing. Code that records money
// (the sale ledger) uses `checked_add` / `checked_mul` and rejects the sale.

/// Plain decimal rendering with two fraction digits and no symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_plain_decimal() {
        assert_eq!(Money::from_cents(249900).to_string(), "2499.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(1000).format_with("Rs."), "Rs. 10.00");
        assert_eq!(Money::from_cents(1000).format_with(""), "10.00");
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(Money::from_cents(1000).percentage(10).cents(), 100);
        // 12.5 → 13
        assert_eq!(Money::from_cents(125).percentage(10).cents(), 13);
        // 12.4 → 12
        assert_eq!(Money::from_cents(124).percentage(10).cents(), 12);
        assert_eq!(Money::from_cents(1000).percentage(100).cents(), 1000);
        assert_eq!(Money::from_cents(1000).percentage(0).cents(), 0);
        assert_eq!(Money::from_cents(i64::MAX).percentage(100).cents(), i64::MAX);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.checked_mul(2), Some(Money::from_cents(i64::MAX / 2 * 2)));
        assert_eq!(huge.checked_mul(3), None);
        assert_eq!(huge.checked_add(huge), Some(Money::from_cents(i64::MAX - 1)));
        assert_eq!(huge.checked_add(huge).and_then(|m| m.checked_add(Money::from_cents(2))), None);
    }

    #[test]
    fn test_operators_saturate() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!((huge * 3).cents(), i64::MAX);
        assert_eq!((huge + huge + huge).cents(), i64::MAX);
        let total: Money = [huge, huge, huge].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MIN).saturating_sub(huge), Money::zero());
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::from_cents(300);
        assert_eq!(a.saturating_sub(Money::from_cents(500)), Money::zero());
        assert_eq!(a.saturating_sub(Money::from_cents(100)).cents(), 200);
    }

    #[test]
    fn test_sum_and_arithmetic() {
        let lines = [Money::from_cents(500), Money::from_cents(250), Money::from_cents(1)];
        let total: Money = lines.iter().copied().sum();
        assert_eq!(total.cents(), 751);
        assert_eq!((Money::from_cents(299) * 3).cents(), 897);
        assert_eq!(Money::from_cents(299).multiply_quantity(3).cents(), 897);
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_cents(1099)).unwrap();
        assert_eq!(json, "1099");
        let back: Money = serde_json::from_str("250").unwrap();
        assert_eq!(back.cents(), 250);
    }
}
