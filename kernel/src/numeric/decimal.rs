//! `ScaledDecimal`: a non-negative decimal `coefficient × 10^exponent`.
//!
//! Every arithmetic operation rounds its exact result to the requested number
//! of significant digits using round-half-even, so nested divisions never run
//! below the caller's precision.

use std::cmp::Ordering;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

use super::precision::Precision;
use super::{decimal_len, pow10};

/// A non-negative arbitrary-precision decimal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledDecimal {
    coefficient: BigUint,
    exponent: i64,
}

impl ScaledDecimal {
    /// Construct `coefficient × 10^exponent` exactly (no rounding).
    #[must_use]
    pub fn new(coefficient: BigUint, exponent: i64) -> Self {
        Self {
            coefficient,
            exponent,
        }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::new(BigUint::zero(), 0)
    }

    #[must_use]
    pub fn from_integer(value: BigUint) -> Self {
        Self::new(value, 0)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    #[must_use]
    pub fn coefficient(&self) -> &BigUint {
        &self.coefficient
    }

    #[must_use]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Number of digits in the coefficient.
    #[must_use]
    pub fn significant_digits(&self) -> usize {
        decimal_len(&self.coefficient)
    }

    /// This value rounded to `precision` significant digits.
    #[must_use]
    pub fn rounded(&self, precision: Precision) -> Self {
        round_half_even(self.coefficient.clone(), self.exponent, precision)
    }

    /// `addend + self`, rounded to `precision` significant digits.
    #[must_use]
    pub fn add_integer(&self, addend: &BigUint, precision: Precision) -> Self {
        if self.exponent >= 0 {
            let exact = addend + &self.coefficient * pow10(self.exponent.unsigned_abs());
            round_half_even(exact, 0, precision)
        } else {
            let exact = addend * pow10(self.exponent.unsigned_abs()) + &self.coefficient;
            round_half_even(exact, self.exponent, precision)
        }
    }

    /// `1 / self`, rounded to `precision` significant digits.
    ///
    /// Returns `None` for zero.
    #[must_use]
    pub fn checked_recip(&self, precision: Precision) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        // Enough quotient digits that rounding always drops at least two of
        // them, plus a sticky digit marking an inexact remainder.
        let shift = precision.digits() + decimal_len(&self.coefficient) + 1;
        let (quotient, remainder) = pow10(shift as u64).div_rem(&self.coefficient);
        let mut coefficient = quotient * 10u8;
        if !remainder.is_zero() {
            coefficient += 1u8;
        }
        let exponent = -as_exponent(shift) - self.exponent - 1;
        Some(round_half_even(coefficient, exponent, precision))
    }

    /// Positional (never scientific) decimal rendering.
    ///
    /// Values below one render with a `"0."` prefix; trailing zeros of the
    /// coefficient are kept, so a value carries all of its significant digits.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let digits = self.coefficient.to_str_radix(10);
        if self.exponent >= 0 {
            let zeros = usize::try_from(self.exponent).unwrap_or(usize::MAX);
            return format!("{digits}{}", "0".repeat(zeros));
        }
        let fraction_len = usize::try_from(self.exponent.unsigned_abs()).unwrap_or(usize::MAX);
        if digits.len() <= fraction_len {
            format!("0.{}{digits}", "0".repeat(fraction_len - digits.len()))
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - fraction_len);
            format!("{int_part}.{frac_part}")
        }
    }
}

impl std::fmt::Display for ScaledDecimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

pub(crate) fn as_exponent(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn round_half_even(coefficient: BigUint, exponent: i64, precision: Precision) -> ScaledDecimal {
    let len = decimal_len(&coefficient);
    let target = precision.digits();
    if len <= target {
        return ScaledDecimal::new(coefficient, exponent);
    }
    let dropped = len - target;
    let (mut kept, remainder) = coefficient.div_rem(&pow10(dropped as u64));
    let half = pow10(dropped as u64 - 1) * 5u8;
    match remainder.cmp(&half) {
        Ordering::Greater => kept += 1u8,
        Ordering::Equal if kept.is_odd() => kept += 1u8,
        Ordering::Equal | Ordering::Less => {}
    }
    let mut exponent = exponent + as_exponent(dropped);
    // Carry out of the top digit (e.g. 999 → 1000): renormalize.
    if decimal_len(&kept) > target {
        kept /= 10u8;
        exponent += 1;
    }
    ScaledDecimal::new(kept, exponent)
}
