//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The system this replaces stored subtotals as SQL floats and trusted    │
//! │  client-side float math. At 1.333 kg × $9.55/kg the stored subtotal     │
//! │  and the recomputed one disagree by fractions of a cent per line, and   │
//! │  daily totals drift.                                                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices are cents per kilogram, weights are grams, subtotals are      │
//! │    cents. One rounding point, defined once, tested once.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use corte_core::money::Money;
//! use corte_core::weight::Weight;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99 per kg
//!
//! // Line subtotal for 2.5 kg
//! let subtotal = price.subtotal_for(Weight::from_grams(2500));
//! assert_eq!(subtotal.cents(), 2748); // 1099 × 2500 / 1000, rounded
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::weight::Weight;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use cents.
    /// Only a display layer converts to currency units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
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

    /// Line subtotal for a per-kilogram price applied to a weight.
    ///
    /// ## The One Rounding Point
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  subtotal = round(price_cents_per_kg × weight_grams / 1000)         │
    /// │                                                                     │
    /// │  $9.55/kg × 1.333 kg                                                │
    /// │    = 955 × 1333 / 1000                                              │
    /// │    = 1272.8 → 1273 cents ($12.73)                                   │
    /// │                                                                     │
    /// │  Every SaleItem.subtotal in the system is produced HERE and then    │
    /// │  frozen. Reports sum the frozen values; nothing re-rounds.          │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(cents × grams + 500) / 1000`.
    /// i128 intermediate prevents overflow on large amounts.
    pub fn subtotal_for(&self, weight: Weight) -> Money {
        let raw = self.0 as i128 * weight.grams() as i128;
        let rounded = if raw >= 0 {
            (raw + 500) / 1000
        } else {
            (raw - 500) / 1000
        };
        Money::from_cents(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
