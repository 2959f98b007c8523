//! # Money Module
//!
//! Provides the `Money` type for derived cost and price figures.
//!
//! ## Whole Rupiah
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rupiah has no fractional sub-unit in this domain.                      │
//! │                                                                         │
//! │  Inputs (unit prices, quantities) stay f64 while the costing chain      │
//! │  runs. Only the four outputs of `compute_all` become Money, rounded     │
//! │  once at the boundary:                                                  │
//! │                                                                         │
//! │    31250 / 0.7 = 44642.857...  ──round──►  Money(44643)                 │
//! │                                                                         │
//! │  Rounding earlier would compound error across the chain.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use hpp_core::money::Money;
//!
//! let hpp = Money::from_rupiah(31_250);
//! let price = Money::round_half_up(44_642.857);
//! assert_eq!((price - hpp).rupiah(), 13_393);
//! assert_eq!(price.to_string(), "Rp 44.643");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::format::group_thousands;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: gross profit can go negative when inputs bypass
///   validation, and that must stay visible rather than saturate
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as a plain integer** so persisted rows and JSON agree
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole Rupiah.
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Rounds a raw amount to the nearest Rupiah, halves rounding up.
    ///
    /// Matches the `Math.round` convention the stored figures were
    /// produced with: `2.5 → 3`, `-2.5 → -2`.
    ///
    /// ```rust
    /// use hpp_core::money::Money;
    ///
    /// assert_eq!(Money::round_half_up(44_642.857).rupiah(), 44_643);
    /// assert_eq!(Money::round_half_up(2.5).rupiah(), 3);
    /// assert_eq!(Money::round_half_up(-2.5).rupiah(), -2);
    /// ```
    pub fn round_half_up(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        let floor = amount.floor();
        let rounded = if amount - floor >= 0.5 { floor + 1.0 } else { floor };
        Money(rounded as i64)
    }

    /// Returns the value in whole Rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns the value as f64 for averaging and display math.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
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
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Formats as `Rp 44.643` (dot thousands separator).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rp {}", group_thousands(self.0))
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(Money::round_half_up(0.0).rupiah(), 0);
        assert_eq!(Money::round_half_up(0.49).rupiah(), 0);
        assert_eq!(Money::round_half_up(0.5).rupiah(), 1);
        assert_eq!(Money::round_half_up(31_250.0).rupiah(), 31_250);
        assert_eq!(Money::round_half_up(13_392.857).rupiah(), 13_393);
        assert_eq!(Money::round_half_up(-1.5).rupiah(), -1);
        assert_eq!(Money::round_half_up(-1.6).rupiah(), -2);
        assert_eq!(Money::round_half_up(-0.5).rupiah(), 0);
        // Largest double below 0.5; adding 0.5 to it would round up to 1.0.
        assert_eq!(Money::round_half_up(0.49999999999999994).rupiah(), 0);
        assert_eq!(Money::round_half_up(4_503_599_627_370_495.0).rupiah(), 4_503_599_627_370_495);
    }

    #[test]
    fn test_round_non_finite_is_zero() {
        assert!(Money::round_half_up(f64::NAN).is_zero());
        assert!(Money::round_half_up(f64::INFINITY).is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_rupiah(0).to_string(), "Rp 0");
        assert_eq!(Money::from_rupiah(999).to_string(), "Rp 999");
        assert_eq!(Money::from_rupiah(1_000).to_string(), "Rp 1.000");
        assert_eq!(Money::from_rupiah(1_234_567).to_string(), "Rp 1.234.567");
        assert_eq!(Money::from_rupiah(-25_000).to_string(), "Rp -25.000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(44_643);
        let b = Money::from_rupiah(31_250);

        assert_eq!((a - b).rupiah(), 13_393);
        assert_eq!((a + b).rupiah(), 75_893);

        let mut c = a;
        c -= b;
        c += b;
        assert_eq!(c, a);

        let total: Money = vec![a, b].into_iter().sum();
        assert_eq!(total.rupiah(), 75_893);
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_rupiah(44_643)).unwrap();
        assert_eq!(json, "44643");
    }
}
