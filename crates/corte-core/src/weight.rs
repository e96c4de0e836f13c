//! # Weight Module
//!
//! Integer-gram weight type, the mass twin of [`crate::money::Money`].
//!
//! ## Why Grams?
//! The shop sells by weight: scales report kilograms with three decimals,
//! and the replaced system stored `peso_kg` as a SQL float. Summing floats
//! across a day of sales accumulates error; summing grams does not. A
//! movement of 2.5 kg is stored as 2500 g, exactly.
//!
//! ## Usage
//! ```rust
//! use corte_core::weight::Weight;
//!
//! let w = Weight::from_grams(2500);
//! assert_eq!(w.grams(), 2500);
//! assert_eq!(format!("{}", w), "2.500 kg");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

// =============================================================================
// Weight Type
// =============================================================================

/// A weight in grams.
///
/// Signed so that ledger folds (`inbound − outbound`) can go negative when
/// the ledger records more consumption than intake; the fold result is a
/// diagnostic value, not a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Weight(i64);

impl Weight {
    /// Creates a weight from grams.
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Weight(grams)
    }

    /// Creates a weight from whole kilograms.
    #[inline]
    pub const fn from_kilos(kilos: i64) -> Self {
        Weight(kilos * 1000)
    }

    /// Returns the weight in grams.
    #[inline]
    pub const fn grams(&self) -> i64 {
        self.0
    }

    /// Returns the whole-kilogram portion.
    #[inline]
    pub const fn kilos(&self) -> i64 {
        self.0 / 1000
    }

    /// Returns the gram remainder (always 0-999).
    #[inline]
    pub const fn grams_part(&self) -> i64 {
        (self.0 % 1000).abs()
    }

    /// Zero weight.
    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    /// Checks if the weight is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the weight is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays as kilograms with gram precision, e.g. `2.500 kg`.
impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:03} kg", sign, self.kilos().abs(), self.grams_part())
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::zero()
    }
}

impl Add for Weight {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Weight(self.0 + other.0)
    }
}

impl AddAssign for Weight {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Weight {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Weight(self.0 - other.0)
    }
}

impl SubAssign for Weight {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Weight {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Weight(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
