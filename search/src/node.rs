//! Stack frames and discoveries.

use trott_kernel::cf::term::TermSequence;

/// One node on the explicit depth-first stack.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) sequence: TermSequence,
    /// Next term to append; trial is ascending from 1.
    pub(crate) next_term: u64,
}

impl Frame {
    pub(crate) fn new(sequence: TermSequence) -> Self {
        Self {
            sequence,
            next_term: 1,
        }
    }
}

/// A reported (valid) sequence.
///
/// `partition` 0 is the calling thread (the whole serial search, or the
/// shallow phase of a parallel one); worker partitions are numbered from 1.
/// `order` counts discoveries within a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub sequence: TermSequence,
    pub partition: usize,
    pub order: u64,
}

impl Discovery {
    /// Sequence length (the absolute search depth).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "depth": self.depth(),
            "order": self.order,
            "partition": self.partition,
            "sequence": self.sequence.to_json_value(),
        })
    }
}
