//! Validity predicate: is a sequence a pre-Trott prefix?
//!
//! A sequence with `d` total digits is valid when the decimal expansion of its
//! value starts with its Trott target `"0." + digits` (`d + 2` characters).
//!
//! # Decision procedure
//!
//! 1. Evaluate at working precision `P = d + guard_digits` (plus the widest
//!    term's digit count when `magnitude_guard` is set).
//! 2. Render the value positionally, keep the first `d + 2` characters and
//!    compare them with the target string.
//! 3. Certify the comparison: the evaluated value is within
//!    `(n + 2) · 10^(1 - P)` of the true value for `n` terms. If truncating
//!    both ends of that interval to `d` fractional digits agrees (or the target
//!    lies outside the truncated interval), the string comparison is final.
//! 4. Otherwise double `P` and repeat, at most `max_refinements` times, then
//!    decide on the exact rational value.

use num_bigint::BigUint;

use crate::cf::digits::{digit_count, widest_term_digits};
use crate::cf::evaluate::{evaluate, evaluate_exact};
use crate::cf::target::{target_digits, trott_target};
use crate::cf::term::TermSequence;
use crate::error::KernelError;
use crate::numeric::decimal::{as_exponent, ScaledDecimal};
use crate::numeric::pow10;
use crate::numeric::precision::Precision;

/// Default guard digits beyond the sequence's digit count.
pub const DEFAULT_GUARD_DIGITS: usize = 2;

/// Default number of precision doublings before the exact fallback.
pub const DEFAULT_MAX_REFINEMENTS: u32 = 4;

/// How much working precision the predicate carries beyond the digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Extra significant digits beyond the sequence's total digit count.
    pub guard_digits: usize,
    /// Also add the digit count of the widest term.
    pub magnitude_guard: bool,
    /// Precision doublings attempted before deciding exactly.
    pub max_refinements: u32,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            guard_digits: DEFAULT_GUARD_DIGITS,
            magnitude_guard: false,
            max_refinements: DEFAULT_MAX_REFINEMENTS,
        }
    }
}

impl GuardPolicy {
    /// Initial working precision for `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::PrecisionUnderflow`] if the result is zero
    /// (empty sequence with no guard digits).
    pub fn working_precision(&self, sequence: &TermSequence) -> Result<Precision, KernelError> {
        let magnitude = if self.magnitude_guard {
            widest_term_digits(sequence)
        } else {
            0
        };
        Precision::new(
            digit_count(sequence)
                .saturating_add(self.guard_digits)
                .saturating_add(magnitude),
        )
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "guard_digits": self.guard_digits,
            "magnitude_guard": self.magnitude_guard,
            "max_refinements": self.max_refinements,
        })
    }
}

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The empty sequence: valid by convention.
    Root,
    /// Rounded evaluation whose error bound cannot change the outcome.
    Certified,
    /// Exact rational evaluation after refinement was exhausted.
    Exact,
}

/// Full outcome of one validity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    /// `"0."` + concatenated term digits.
    pub target: String,
    /// Leading `target.len()` characters of the rendered value.
    pub rendered_prefix: String,
    /// Precision of the last rounded evaluation.
    pub precision: Precision,
    /// Number of precision doublings performed.
    pub refinements: u32,
    pub decision: Decision,
}

/// The branch-admission oracle of the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityOracle {
    guard: GuardPolicy,
}

impl ValidityOracle {
    #[must_use]
    pub fn new(guard: GuardPolicy) -> Self {
        Self { guard }
    }

    #[must_use]
    pub fn guard(&self) -> &GuardPolicy {
        &self.guard
    }

    /// Decide validity and report how the decision was reached.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::PrecisionUnderflow`] if the working precision is
    /// zero, or [`KernelError::MalformedTerm`] from evaluation.
    pub fn check(&self, sequence: &TermSequence) -> Result<Verdict, KernelError> {
        let mut precision = self.guard.working_precision(sequence)?;
        let target = trott_target(sequence);
        if sequence.is_empty() {
            return Ok(Verdict {
                valid: true,
                rendered_prefix: target.clone(),
                target,
                precision,
                refinements: 0,
                decision: Decision::Root,
            });
        }

        let fraction_digits = digit_count(sequence);
        let expected = target_digits(sequence);
        for refinement in 0..=self.guard.max_refinements {
            let value = evaluate(sequence, precision)?;
            if is_certified(&value, sequence.len(), precision, fraction_digits, &expected) {
                let rendered_prefix = leading(&value.to_plain_string(), target.len());
                return Ok(Verdict {
                    valid: rendered_prefix == target,
                    rendered_prefix,
                    target,
                    precision,
                    refinements: refinement,
                    decision: Decision::Certified,
                });
            }
            if refinement < self.guard.max_refinements {
                precision = precision.doubled();
            }
        }

        let exact = evaluate_exact(sequence);
        let rendered_prefix = leading(&exact.truncated_string(fraction_digits), target.len());
        Ok(Verdict {
            valid: rendered_prefix == target,
            rendered_prefix,
            target,
            precision,
            refinements: self.guard.max_refinements,
            decision: Decision::Exact,
        })
    }

    /// # Errors
    ///
    /// See [`ValidityOracle::check`].
    pub fn is_valid(&self, sequence: &TermSequence) -> Result<bool, KernelError> {
        self.check(sequence).map(|v| v.valid)
    }
}

/// Validity under the default guard policy.
///
/// # Errors
///
/// See [`ValidityOracle::check`].
pub fn is_pre_trott(sequence: &TermSequence) -> Result<bool, KernelError> {
    ValidityOracle::default().is_valid(sequence)
}

/// Validity of raw integers under the default guard policy.
///
/// # Errors
///
/// Returns [`KernelError::MalformedTerm`] if any value is zero.
pub fn is_pre_trott_raw(values: &[u64]) -> Result<bool, KernelError> {
    is_pre_trott(&TermSequence::from_u64s(values)?)
}

fn leading(rendered: &str, len: usize) -> String {
    rendered.chars().take(len).collect()
}

/// Whether the truncation to `fraction_digits` is settled by the error bound.
fn is_certified(
    value: &ScaledDecimal,
    term_count: usize,
    precision: Precision,
    fraction_digits: usize,
    expected: &BigUint,
) -> bool {
    // Work in integer units of 10^-scale.
    let exponent = value.exponent();
    let scale = as_exponent(precision.digits() - 1)
        .max(-exponent)
        .max(as_exponent(fraction_digits));
    let scale_u = scale.unsigned_abs();
    let scaled = value.coefficient() * pow10((exponent + scale).unsigned_abs());
    let error = BigUint::from(term_count + 2) * pow10(scale_u + 1 - precision.digits() as u64);
    let low = if scaled > error {
        &scaled - &error
    } else {
        BigUint::default()
    };
    let high = scaled + error;
    let unit = pow10(scale_u - fraction_digits as u64);
    let low_digits = low / &unit;
    let high_digits = high / &unit;
    low_digits == high_digits || expected < &low_digits || expected > &high_digits
}
