//! Search policy types.

use std::num::NonZeroUsize;

use trott_kernel::cf::term::TermSequence;
use trott_kernel::validity::{GuardPolicy, ValidityOracle};

use crate::error::SearchError;

/// Bounds and starting point of a backtracking search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Maximum sequence length. Nodes shorter than this are expanded.
    pub max_depth: usize,
    /// Exclusive upper bound on trial terms: terms run over `[1, max_term)`.
    pub max_term: u64,
    /// Sequence to resume from; empty means the root.
    pub starting_prefix: TermSequence,
    /// Working-precision policy of the validity predicate.
    pub guard: GuardPolicy,
}

impl SearchPolicy {
    #[must_use]
    pub fn new(max_depth: usize, max_term: u64) -> Self {
        Self {
            max_depth,
            max_term,
            starting_prefix: TermSequence::empty(),
            guard: GuardPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: TermSequence) -> Self {
        self.starting_prefix = prefix;
        self
    }

    #[must_use]
    pub fn with_guard(mut self, guard: GuardPolicy) -> Self {
        self.guard = guard;
        self
    }

    /// The validity oracle this policy describes.
    #[must_use]
    pub fn oracle(&self) -> ValidityOracle {
        ValidityOracle::new(self.guard)
    }

    /// Structural checks. Prefix validity is checked by the engine against
    /// whichever oracle it runs with.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] if either bound is zero or the
    /// starting prefix already reaches `max_depth`.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_depth == 0 {
            return Err(SearchError::InvalidPolicy {
                detail: "max_depth must be at least 1".into(),
            });
        }
        if self.max_term == 0 {
            return Err(SearchError::InvalidPolicy {
                detail: "max_term must be at least 1".into(),
            });
        }
        if self.starting_prefix.len() >= self.max_depth {
            return Err(SearchError::InvalidPolicy {
                detail: format!(
                    "starting prefix [{}] has length {} but max_depth is {}",
                    self.starting_prefix,
                    self.starting_prefix.len(),
                    self.max_depth
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "guard": self.guard.to_json_value(),
            "max_depth": self.max_depth,
            "max_term": self.max_term,
            "starting_prefix": self.starting_prefix.to_json_value(),
        })
    }
}

/// Worker-pool configuration for [`crate::parallel::search_parallel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelPolicy {
    pub workers: NonZeroUsize,
    /// Sequence length at which the tree is split into partitions.
    pub fan_out_depth: usize,
}

impl ParallelPolicy {
    #[must_use]
    pub fn new(workers: NonZeroUsize) -> Self {
        Self {
            workers,
            fan_out_depth: 1,
        }
    }

    #[must_use]
    pub fn with_fan_out_depth(mut self, fan_out_depth: usize) -> Self {
        self.fan_out_depth = fan_out_depth;
        self
    }

    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] unless the fan-out depth is
    /// greater than the starting prefix length of `search`.
    pub fn validate(&self, search: &SearchPolicy) -> Result<(), SearchError> {
        if self.fan_out_depth <= search.starting_prefix.len() {
            return Err(SearchError::InvalidPolicy {
                detail: format!(
                    "fan_out_depth {} must exceed the starting prefix length {}",
                    self.fan_out_depth,
                    search.starting_prefix.len()
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "fan_out_depth": self.fan_out_depth,
            "workers": self.workers.get(),
        })
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self::new(std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }
}
