//! Typed search errors.
//!
//! `InvalidPolicy` is a pre-flight failure: nothing was evaluated or reported.
//! The other variants abort a running search; discoveries already handed to
//! the sink stay there.

use trott_kernel::error::KernelError;

/// Typed failure for search validation and execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The policy is structurally invalid or its starting prefix is dead.
    InvalidPolicy { detail: String },
    /// The validity predicate failed (malformed term, precision underflow).
    Kernel(KernelError),
    /// The result sink refused a discovery.
    SinkFailed { detail: String },
    /// A worker thread panicked while exploring a partition.
    WorkerPanicked { partition: usize },
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPolicy { detail } => write!(f, "invalid search policy: {detail}"),
            Self::Kernel(e) => write!(f, "validity predicate failed: {e}"),
            Self::SinkFailed { detail } => write!(f, "result sink failed: {detail}"),
            Self::WorkerPanicked { partition } => {
                write!(f, "worker panicked while exploring partition {partition}")
            }
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Kernel(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KernelError> for SearchError {
    fn from(e: KernelError) -> Self {
        Self::Kernel(e)
    }
}
