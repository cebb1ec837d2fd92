//! Typed kernel errors.
//!
//! Both variants are fatal to any search that encounters them: they signal a
//! configuration or generation bug, never a property of the search space. A
//! well-formed sequence that simply is not a pre-Trott prefix is not an error.

/// Typed failure for term construction, evaluation and validity checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// A term is not a positive integer (zero, signed, empty, non-digit, or
    /// written with a leading zero).
    MalformedTerm {
        /// Position of the offending term in its sequence, when known.
        index: Option<usize>,
        detail: String,
    },
    /// A working precision of zero significant digits was requested.
    PrecisionUnderflow { requested: usize },
}

impl KernelError {
    /// Attach a sequence position to a `MalformedTerm` that lacks one.
    #[must_use]
    pub fn at_index(self, position: usize) -> Self {
        match self {
            Self::MalformedTerm {
                index: None,
                detail,
            } => Self::MalformedTerm {
                index: Some(position),
                detail,
            },
            other => other,
        }
    }
}

impl std::fmt::Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTerm {
                index: Some(i),
                detail,
            } => write!(f, "malformed term at index {i}: {detail}"),
            Self::MalformedTerm {
                index: None,
                detail,
            } => write!(f, "malformed term: {detail}"),
            Self::PrecisionUnderflow { requested } => {
                write!(f, "precision underflow: {requested} significant digits requested")
            }
        }
    }
}

impl std::error::Error for KernelError {}
