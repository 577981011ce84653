//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  Chained discount/tip arithmetic drifts a cent at a time, and the   │
//! │  register reconciliation then reports phantom differences.          │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Centavos                                     │
//! │    R$10.00 = 1000 centavos, every calculation stays exact           │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pdv_core::money::Money;
//!
//! // Create from centavos (preferred)
//! let price = Money::from_cents(2200); // R$22.00
//!
//! // Arithmetic operations
//! let line = price * 2i64;                    // R$44.00
//! let tip = line.apply_rate(1000);            // 10% => R$4.40
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: reconciliation differences can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support, sqlx transparent binding when the
///   `sqlx` feature is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use pdv_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (reais and centavos).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -R$5.50, not -R$4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (reais) portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Clamps the value at zero: negative amounts become `Money::zero()`.
    ///
    /// Used for the "total never goes negative" and "change never goes
    /// negative" rules:
    ///
    /// ```rust
    /// use pdv_core::money::Money;
    ///
    /// let t = Money::from_cents(-250);
    /// assert_eq!(t.clamp_zero(), Money::zero());
    /// assert_eq!(Money::from_cents(250).clamp_zero().cents(), 250);
    /// ```
    #[inline]
    pub const fn clamp_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Applies a basis-point rate and returns the resulting amount.
    ///
    /// ## Arguments
    /// * `rate_bps` - Rate in basis points (1000 = 10%)
    ///
    /// ## Rounding
    /// Integer math with half-up rounding: `(cents * bps + 5000) / 10000`.
    /// i128 intermediate prevents overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use pdv_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(4400); // R$44.00
    /// assert_eq!(subtotal.apply_rate(1000).cents(), 440); // 10% => R$4.40
    /// ```
    pub fn apply_rate(&self, rate_bps: u32) -> Money {
        let amount = (self.0 as i128 * rate_bps as i128 + 5000) / 10000;
        Money::from_cents(amount as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use pdv_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // R$2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for debugging and receipts. UI localization is out of scope.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R${}.{:02}", sign, self.reais().abs(), self.cents_part())
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

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.reais(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "R$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "R$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-R$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "R$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_apply_rate_basic() {
        // R$10.00 at 10% = R$1.00
        let amount = Money::from_cents(1000);
        assert_eq!(amount.apply_rate(1000).cents(), 100);
    }

    #[test]
    fn test_apply_rate_with_rounding() {
        // R$10.00 at 8.25% = R$0.825 -> rounds half-up to R$0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.apply_rate(825).cents(), 83);
    }

    #[test]
    fn test_clamp_zero() {
        assert_eq!(Money::from_cents(-1).clamp_zero(), Money::zero());
        assert_eq!(Money::from_cents(0).clamp_zero(), Money::zero());
        assert_eq!(Money::from_cents(42).clamp_zero().cents(), 42);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_sum_iterator() {
        let total: Money = [100, 250, 50].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 400);
    }
}
