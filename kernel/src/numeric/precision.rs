//! Working precision, in significant decimal digits.

use std::num::NonZeroUsize;

use crate::error::KernelError;

/// A strictly positive number of significant decimal digits.
///
/// Construct via [`Precision::new`]; zero is rejected with
/// [`KernelError::PrecisionUnderflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Precision(NonZeroUsize);

impl Precision {
    /// # Errors
    ///
    /// Returns [`KernelError::PrecisionUnderflow`] if `digits` is zero.
    pub fn new(digits: usize) -> Result<Self, KernelError> {
        NonZeroUsize::new(digits)
            .map(Self)
            .ok_or(KernelError::PrecisionUnderflow { requested: digits })
    }

    #[must_use]
    pub fn digits(self) -> usize {
        self.0.get()
    }

    /// Twice the current precision (saturating).
    #[must_use]
    pub fn doubled(self) -> Self {
        NonZeroUsize::new(self.0.get().saturating_mul(2)).map_or(self, Self)
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} digits", self.0)
    }
}
