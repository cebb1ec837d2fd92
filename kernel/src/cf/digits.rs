//! Digit counter: sizes the working precision and the comparison length.

use crate::cf::term::{Term, TermSequence};
use crate::error::KernelError;
use crate::numeric::decimal_len;

/// Decimal digit count of a single term.
#[must_use]
pub fn term_digits(term: &Term) -> usize {
    decimal_len(term.value())
}

/// Total decimal digits across all terms (`[100, 5, 7, 99]` → 7).
#[must_use]
pub fn digit_count(sequence: &TermSequence) -> usize {
    sequence.terms().iter().map(term_digits).sum()
}

/// Digit count of raw integers.
///
/// # Errors
///
/// Returns [`KernelError::MalformedTerm`] if any value is zero.
pub fn digit_count_raw(values: &[u64]) -> Result<usize, KernelError> {
    TermSequence::from_u64s(values).map(|s| digit_count(&s))
}

/// Digit count of the largest term (0 for the empty sequence).
#[must_use]
pub fn widest_term_digits(sequence: &TermSequence) -> usize {
    sequence.terms().iter().map(term_digits).max().unwrap_or(0)
}
