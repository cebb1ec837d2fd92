//! Continued-fraction evaluation.
//!
//! [`evaluate`] folds `1/(a1 + 1/(a2 + ...))` from the innermost term outward
//! with every addition and reciprocal rounded at the requested precision.
//! [`evaluate_exact`] computes the same value as an exact fraction.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::cf::term::TermSequence;
use crate::error::KernelError;
use crate::numeric::decimal::ScaledDecimal;
use crate::numeric::pow10;
use crate::numeric::precision::Precision;

/// Value of the continued fraction at `precision` significant digits.
///
/// The empty sequence evaluates to 0.
///
/// # Errors
///
/// Returns [`KernelError::MalformedTerm`] if a denominator evaluates to zero,
/// which only a zero term can cause.
pub fn evaluate(sequence: &TermSequence, precision: Precision) -> Result<ScaledDecimal, KernelError> {
    let mut curr = ScaledDecimal::zero();
    for (index, term) in sequence.terms().iter().enumerate().rev() {
        let denominator = curr.add_integer(term.value(), precision);
        curr = denominator
            .checked_recip(precision)
            .ok_or_else(|| KernelError::MalformedTerm {
                index: Some(index),
                detail: "denominator evaluated to zero".into(),
            })?;
    }
    Ok(curr)
}

/// Exact value `numerator / denominator` of a continued fraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactValue {
    pub numerator: BigUint,
    pub denominator: BigUint,
}

impl ExactValue {
    /// `floor(value × 10^fraction_digits)`.
    #[must_use]
    pub fn scaled_floor(&self, fraction_digits: usize) -> BigUint {
        (&self.numerator * pow10(fraction_digits as u64)) / &self.denominator
    }

    /// Positional rendering truncated (not rounded) to `fraction_digits`
    /// digits after the point.
    #[must_use]
    pub fn truncated_string(&self, fraction_digits: usize) -> String {
        let (int_part, rest) = self.numerator.div_rem(&self.denominator);
        if fraction_digits == 0 {
            return int_part.to_string();
        }
        let fraction = ((rest * pow10(fraction_digits as u64)) / &self.denominator).to_string();
        let padding = "0".repeat(fraction_digits.saturating_sub(fraction.len()));
        format!("{int_part}.{padding}{fraction}")
    }
}

/// Exact evaluation via the inner-to-outer fold `p/q ↦ q/(t·q + p)`.
#[must_use]
pub fn evaluate_exact(sequence: &TermSequence) -> ExactValue {
    let mut numerator = BigUint::zero();
    let mut denominator = BigUint::one();
    for term in sequence.terms().iter().rev() {
        let next_denominator = term.value() * &denominator + &numerator;
        numerator = denominator;
        denominator = next_denominator;
    }
    ExactValue {
        numerator,
        denominator,
    }
}
