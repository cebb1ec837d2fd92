//! Arbitrary-precision decimal arithmetic with explicit, per-call precision.
//!
//! There is no ambient precision context: every rounding operation takes a
//! [`precision::Precision`] argument, so evaluations at different precisions
//! can run concurrently without interfering.

pub mod decimal;
pub mod precision;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// `10^exp` as a big integer.
#[must_use]
pub fn pow10(exp: u64) -> BigUint {
    BigUint::from(10u8).pow(u32::try_from(exp).unwrap_or(u32::MAX))
}

/// Number of decimal digits in `value` (`0` has one digit).
#[must_use]
pub fn decimal_len(value: &BigUint) -> usize {
    match value.to_u64() {
        Some(small) => small.checked_ilog10().map_or(1, |log| log as usize + 1),
        None => value.to_str_radix(10).len(),
    }
}
