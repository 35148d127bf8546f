//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  In many retail systems:                                            │
//! │    Rs 10.00 / 3 = Rs 3.33 (×3 = Rs 9.99)  → Lost Rs 0.01!           │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Paise                                        │
//! │    1000 paise / 3 = 333 paise (×3 = 999 paise)                      │
//! │    We KNOW we lost 1 paisa, and handle it explicitly                │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dukaan_core::money::Money;
//!
//! // Create from paise (preferred)
//! let price = Money::from_paise(1099); // Rs 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // Rs 21.98
//! let total = price + Money::from_paise(500);    // Rs 15.99
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for balances owed the customer
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Stock.regular_price_paise ──► special price override ──► OrderItem snapshot
///                                                              │
///                                                              ▼
/// Payment.amount_paise ◄── customer balance ◄── Order.total_amount_paise
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use dukaan_core::money::Money;
    ///
    /// let price = Money::from_paise(1099); // Represents Rs 10.99
    /// assert_eq!(price.paise(), 1099);
    /// ```
    ///
    /// ## Why Paise?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use paise.
    /// Only the UI converts to rupees for display.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// ## Example
    /// ```rust
    /// use dukaan_core::money::Money;
    ///
    /// let price = Money::from_rupees_paise(10, 99); // Rs 10.99
    /// assert_eq!(price.paise(), 1099);
    ///
    /// let owed = Money::from_rupees_paise(-5, 50); // -Rs 5.50
    /// assert_eq!(owed.paise(), -550);
    /// ```
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise (smallest currency unit).
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the rupee (major unit) portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise (minor unit) portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
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

    /// Multiplies money by a quantity, returning `None` on i64 overflow.
    ///
    /// ## Example
    /// ```rust
    /// use dukaan_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(299); // Rs 2.99
    /// let line_total = unit_price.checked_mul_quantity(3).unwrap();
    /// assert_eq!(line_total.paise(), 897); // Rs 8.97
    ///
    /// assert!(Money::from_paise(i64::MAX / 2).checked_mul_quantity(3).is_none());
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Stock: Parle-G Rs 2.99
    /// Quantity: 3
    ///      │
    ///      ▼
    /// checked_mul_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: Rs 8.97
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Adds two money values, returning `None` on i64 overflow.
    ///
    /// Totals are accumulated with this rather than `+`, so an overflowing
    /// order surfaces as an error instead of a wrong amount.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rs {}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// The operator forms panic loudly on overflow in every build profile.
// Fallible call sites (order totals) use the checked_* methods instead.

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        self.checked_add(other).expect("Money addition overflowed")
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(
            self.0
                .checked_sub(other.0)
                .expect("Money subtraction overflowed"),
        )
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        self * qty as i64
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.checked_mul_quantity(qty)
            .expect("Money multiplication overflowed")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_from_rupees_paise() {
        let money = Money::from_rupees_paise(10, 99);
        assert_eq!(money.paise(), 1099);

        let negative = Money::from_rupees_paise(-5, 50);
        assert_eq!(negative.paise(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1099)), "Rs 10.99");
        assert_eq!(format!("{}", Money::from_paise(500)), "Rs 5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-Rs 5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "Rs 0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        let result: Money = a * 3;
        assert_eq!(result.paise(), 3000);
    }

    #[test]
    fn test_checked_mul_quantity() {
        let unit_price = Money::from_paise(299);
        let line_total = unit_price.checked_mul_quantity(3).unwrap();
        assert_eq!(line_total.paise(), 897);

        assert!(Money::from_paise(i64::MAX / 2)
            .checked_mul_quantity(3)
            .is_none());
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_paise(1000);
        assert_eq!(a.checked_add(Money::from_paise(500)), Some(Money::from_paise(1500)));
        assert!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)).is_none());
    }

    #[test]
    #[should_panic(expected = "Money multiplication overflowed")]
    fn test_operator_mul_panics_on_overflow() {
        let _ = Money::from_paise(i64::MAX / 2) * 3;
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let owed = Money::from_paise(-100);
        assert!(owed.is_negative());
        assert_eq!(owed.abs().paise(), 100);
    }

    /// Critical test: Verify that Rs 10.00 / 3 × 3 behaves as expected.
    /// This documents the intentional precision loss.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_rupees = Money::from_paise(1000);
        let one_third = Money::from_paise(1000 / 3); // 333 paise
        let reconstructed: Money = one_third * 3; // 999 paise

        assert_eq!(reconstructed.paise(), 999);
        let lost = ten_rupees - reconstructed;
        assert_eq!(lost.paise(), 1);
    }
}
