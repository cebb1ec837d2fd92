//! Seams between the search engine and its collaborators.
//!
//! - [`BranchOracle`] decides whether a candidate is alive (reported and
//!   recursed into).
//! - [`ResultSink`] receives every discovery in report order.
//! - [`BranchControl`] lets the caller decline subtrees or cancel the search.
//!
//! Oracles and controls are shared by reference across worker threads, so
//! both require `Sync`. Sinks are only ever driven from the calling thread.

use trott_kernel::cf::term::TermSequence;
use trott_kernel::error::KernelError;
use trott_kernel::validity::ValidityOracle;

use crate::node::Discovery;

/// Branch-admission decision for a candidate sequence.
pub trait BranchOracle: Sync {
    /// Whether `sequence` is alive.
    ///
    /// # Errors
    ///
    /// Any [`KernelError`] aborts the search.
    fn admits(&self, sequence: &TermSequence) -> Result<bool, KernelError>;
}

impl BranchOracle for ValidityOracle {
    fn admits(&self, sequence: &TermSequence) -> Result<bool, KernelError> {
        self.is_valid(sequence)
    }
}

/// A sink refused a discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    pub detail: String,
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.detail)
    }
}

impl std::error::Error for SinkError {}

/// Receiver of reported sequences.
pub trait ResultSink {
    /// Accept one discovery. An error aborts the search.
    ///
    /// # Errors
    ///
    /// Implementation-defined; surfaced as `SearchError::SinkFailed`.
    fn report(&mut self, discovery: &Discovery) -> Result<(), SinkError>;
}

/// Caller-side steering: consulted before every node expansion.
pub trait BranchControl: Sync {
    /// Whether the subtree below `sequence` should be explored.
    fn should_expand(&self, sequence: &TermSequence) -> bool {
        let _ = sequence;
        true
    }

    /// Whether the whole search should stop before the next candidate.
    fn is_cancelled(&self) -> bool {
        false
    }
}
