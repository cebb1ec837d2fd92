//! Terms and term sequences.
//!
//! A [`TermSequence`] stores the denominators `[a1, a2, ...]` of the continued
//! fraction `0 + 1/(a1 + 1/(a2 + ...))`; the zero integer part is implicit.
//! Sequences are values: extension returns a new sequence and never mutates a
//! sequence another branch may still hold.

use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::KernelError;

/// A positive integer continued-fraction term of unbounded magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(BigUint);

impl Term {
    /// # Errors
    ///
    /// Returns [`KernelError::MalformedTerm`] if `value` is zero.
    pub fn new(value: u64) -> Result<Self, KernelError> {
        Self::from_biguint(BigUint::from(value))
    }

    /// # Errors
    ///
    /// Returns [`KernelError::MalformedTerm`] if `value` is zero.
    pub fn from_biguint(value: BigUint) -> Result<Self, KernelError> {
        if value.is_zero() {
            return Err(KernelError::MalformedTerm {
                index: None,
                detail: "term must be a positive integer, got 0".into(),
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl FromStr for Term {
    type Err = KernelError;

    /// Parse a canonical decimal term: ASCII digits only, no sign, no
    /// leading zero, not zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |detail: String| KernelError::MalformedTerm {
            index: None,
            detail,
        };
        if s.is_empty() {
            return Err(malformed("empty term".into()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(format!("term {s:?} is not a plain decimal integer")));
        }
        if s.starts_with('0') {
            return Err(malformed(format!(
                "term {s:?} is zero or carries a leading zero"
            )));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| malformed(format!("term {s:?} is not a plain decimal integer")))
            .and_then(Self::from_biguint)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, finite list of terms: one candidate continued fraction.
///
/// Ordering is lexicographic by term with a proper prefix sorting before its
/// extensions, which is exactly depth-first ascending-term discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermSequence {
    terms: Vec<Term>,
}

impl TermSequence {
    /// The empty sequence: the search root, value 0.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    /// Validate raw integers into a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::MalformedTerm`] naming the first zero entry.
    pub fn from_u64s(values: &[u64]) -> Result<Self, KernelError> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Term::new(v).map_err(|e| e.at_index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Term> {
        self.terms.last()
    }

    /// A new sequence with `term` appended.
    #[must_use]
    pub fn extended(&self, term: Term) -> Self {
        let mut terms = Vec::with_capacity(self.terms.len() + 1);
        terms.extend_from_slice(&self.terms);
        terms.push(term);
        Self { terms }
    }

    /// The sequence without its last term (`None` for the empty sequence).
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.terms.split_last()?;
        Some(Self::new(init.to_vec()))
    }

    /// Whether `self` is a (not necessarily proper) prefix of `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.terms.starts_with(&self.terms)
    }

    /// JSON form: an array of decimal strings (terms may exceed 64 bits).
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.terms
                .iter()
                .map(|t| serde_json::Value::String(t.to_string()))
                .collect(),
        )
    }

    /// Parse the JSON form produced by [`TermSequence::to_json_value`].
    ///
    /// Plain JSON integers are accepted as well as decimal strings.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::MalformedTerm`] if the value is not an array or
    /// any entry is not a positive integer.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, KernelError> {
        let entries = value.as_array().ok_or_else(|| KernelError::MalformedTerm {
            index: None,
            detail: "term sequence must be a JSON array".into(),
        })?;
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let parsed = match entry {
                    serde_json::Value::String(s) => s.parse::<Term>(),
                    serde_json::Value::Number(n) => match n.as_u64() {
                        Some(v) => Term::new(v),
                        None => Err(KernelError::MalformedTerm {
                            index: None,
                            detail: format!("term {n} is not a positive integer"),
                        }),
                    },
                    other => Err(KernelError::MalformedTerm {
                        index: None,
                        detail: format!("term {other} is neither a string nor an integer"),
                    }),
                };
                parsed.map_err(|e| e.at_index(i))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl FromStr for TermSequence {
    type Err = KernelError;

    /// Parse a comma-separated list such as `"3,29,5,7"`. Surrounding
    /// whitespace and brackets are ignored; an empty list is the empty sequence.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim();
        let inner = inner
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(inner)
            .trim();
        if inner.is_empty() {
            return Ok(Self::empty());
        }
        inner
            .split(',')
            .enumerate()
            .map(|(i, part)| part.trim().parse::<Term>().map_err(|e| e.at_index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl std::fmt::Display for TermSequence {
    /// Comma-separated terms, e.g. `3,29,5,7` (round-trips through `FromStr`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}
