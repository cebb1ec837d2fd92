//! Trott-target formatter: the decimal string a pre-Trott sequence must match.

use std::fmt::Write;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::cf::digits::{digit_count, term_digits};
use crate::cf::term::TermSequence;
use crate::numeric::pow10;

/// `"0."` followed by each term's canonical decimal digits, in order.
#[must_use]
pub fn trott_target(sequence: &TermSequence) -> String {
    let mut out = String::with_capacity(2 + digit_count(sequence));
    out.push_str("0.");
    for term in sequence.terms() {
        let _ = write!(out, "{term}");
    }
    out
}

/// The concatenated term digits as one integer (`[3, 29, 5, 7]` → 32957).
#[must_use]
pub fn target_digits(sequence: &TermSequence) -> BigUint {
    sequence.terms().iter().fold(BigUint::zero(), |acc, term| {
        acc * pow10(term_digits(term) as u64) + term.value()
    })
}
