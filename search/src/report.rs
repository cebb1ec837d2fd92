//! Search report: why the search stopped and how much work it did.

use trott_kernel::digest::canon::{canonical_json_bytes, CanonError};

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Every admitted branch was explored to `max_depth`.
    Exhausted,
    /// The branch control requested cancellation.
    Cancelled,
}

impl TerminationReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Counters of one search run (serial, or all partitions of a parallel run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub termination: TerminationReason,
    /// Predicate calls on candidate extensions (the starting prefix check is
    /// not counted).
    pub candidates_evaluated: u64,
    pub sequences_reported: u64,
    /// Nodes the branch control declined to expand.
    pub branches_declined: u64,
    /// Length of the longest reported sequence (0 if nothing was reported).
    pub deepest_level: usize,
    /// Largest explicit-stack size reached by any single traversal.
    pub stack_high_water: usize,
    /// Worker partitions explored (0 for a serial run).
    pub partitions: usize,
}

impl SearchReport {
    pub(crate) fn new() -> Self {
        Self {
            termination: TerminationReason::Exhausted,
            candidates_evaluated: 0,
            sequences_reported: 0,
            branches_declined: 0,
            deepest_level: 0,
            stack_high_water: 0,
            partitions: 0,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.termination == TerminationReason::Cancelled
    }

    /// Fold another traversal's counters into this report.
    pub(crate) fn absorb(&mut self, other: &Self) {
        if other.is_cancelled() {
            self.termination = TerminationReason::Cancelled;
        }
        self.candidates_evaluated += other.candidates_evaluated;
        self.sequences_reported += other.sequences_reported;
        self.branches_declined += other.branches_declined;
        self.deepest_level = self.deepest_level.max(other.deepest_level);
        self.stack_high_water = self.stack_high_water.max(other.stack_high_water);
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "branches_declined": self.branches_declined,
            "candidates_evaluated": self.candidates_evaluated,
            "deepest_level": self.deepest_level,
            "partitions": self.partitions,
            "sequences_reported": self.sequences_reported,
            "stack_high_water": self.stack_high_water,
            "termination": self.termination.as_str(),
        })
    }

    /// # Errors
    ///
    /// Never in practice (all fields are integers or strings); the
    /// [`CanonError`] is propagated from the canonical writer.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }
}
