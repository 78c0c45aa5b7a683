//! # Money Module
//!
//! Provides `Money` for monetary values and `DiscountRate` for percentage
//! discounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cart of 40 lines with 7.5% discounts summed as floats drifts by a   │
//! │  fraction of a unit, and the receipt no longer matches the report.     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Every amount is an i64 count of the smallest currency unit.         │
//! │    Rounding happens once per line, explicitly.                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dokon_core::money::{DiscountRate, Money};
//!
//! let price = Money::from_cents(12_500);
//! let line = price * 3;
//! assert_eq!(line.cents(), 37_500);
//!
//! let discounted = line.apply_discount(DiscountRate::from_percent(10));
//! assert_eq!(discounted.cents(), 33_750);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative
/// - **Single field tuple struct**: serializes as a bare JSON number
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.selling_price ──► CartLine.unit_price ──► SaleItem.price       │
/// │                                                                         │
/// │  Cart.subtotal − Cart.discount_amount ──► Sale.total ──► Reports        │
/// │                                                                         │
/// │  Product.cost_price ──► profit / margin                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use dokon_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units (no minor part).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use dokon_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    ///
    /// Saturates at the `i64` bounds instead of overflowing.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns the amount taken off by a discount, rounded half up.
    ///
    /// Uses integer math: `(amount * bps + 5000) / 10000`. For a
    /// non-negative amount and a rate within 0..=100% the result never
    /// exceeds the amount itself.
    pub fn discount_amount(&self, rate: DiscountRate) -> Money {
        // i128 keeps large amounts from overflowing before the division
        let off = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(off as i64)
    }

    /// Returns the amount left after a discount.
    ///
    /// ```rust
    /// use dokon_core::money::{DiscountRate, Money};
    ///
    /// let subtotal = Money::from_cents(10000);
    /// let discounted = subtotal.apply_discount(DiscountRate::from_percent(10));
    /// assert_eq!(discounted.cents(), 9000);
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        *self - self.discount_amount(rate)
    }

    /// Returns `self / whole × 100`, or 0 when `whole` is zero.
    ///
    /// For display only (payment shares, margins).
    pub fn percent_of(&self, whole: Money) -> f64 {
        if whole.is_zero() {
            return 0.0;
        }
        self.0 as f64 / whole.0 as f64 * 100.0
    }

    /// Integer division by a count, 0 when the count is zero.
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(self.0 / count as i64)
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage discount stored in basis points.
///
/// 1 basis point = 0.01%, so 1000 bps = 10% and 10000 bps = 100%.
/// Valid rates are 0..=10000; see [`crate::validation::validate_discount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Largest valid rate (100%).
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from whole percent.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering; currency symbols are the config's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
        assert_eq!(Money::from_major(15).cents(), 1500);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(1_000);
        assert_eq!(big.multiply_quantity(i64::MAX / 10).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MAX) + big).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - big).cents(), i64::MIN);

        let total: Money = vec![Money::from_cents(i64::MAX), big].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_discount_rounding() {
        // 999 × 12.5% = 124.875 → 125
        let amount = Money::from_cents(999);
        assert_eq!(amount.discount_amount(DiscountRate::from_bps(1250)).cents(), 125);
        assert_eq!(amount.apply_discount(DiscountRate::from_bps(1250)).cents(), 874);
    }

    #[test]
    fn test_full_discount_never_goes_negative() {
        let amount = Money::from_cents(12_345);
        let rest = amount.apply_discount(DiscountRate::from_percent(100));
        assert!(rest.is_zero());
    }

    #[test]
    fn test_percent_of_and_average_handle_zero() {
        assert_eq!(Money::from_cents(50).percent_of(Money::zero()), 0.0);
        assert_eq!(Money::from_cents(100).average_over(0), Money::zero());
        assert_eq!(Money::from_cents(100).average_over(3).cents(), 33);
        let share = Money::from_cents(15_000).percent_of(Money::from_cents(35_000));
        assert!((share - 42.857).abs() < 0.001);
    }

    #[test]
    fn test_money_serializes_as_number() {
        let json = serde_json::to_string(&Money::from_cents(2500)).unwrap();
        assert_eq!(json, "2500");
        let rate: DiscountRate = serde_json::from_str("750").unwrap();
        assert_eq!(rate.bps(), 750);
    }
}
