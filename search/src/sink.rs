//! Stock sinks and branch controls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use trott_kernel::cf::term::TermSequence;

use crate::contract::{BranchControl, ResultSink, SinkError};
use crate::node::Discovery;

/// Keeps every discovery in report order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    discoveries: Vec<Discovery>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn discoveries(&self) -> &[Discovery] {
        &self.discoveries
    }

    /// Reported sequences in report order.
    #[must_use]
    pub fn sequences(&self) -> Vec<TermSequence> {
        self.discoveries.iter().map(|d| d.sequence.clone()).collect()
    }

    #[must_use]
    pub fn into_discoveries(self) -> Vec<Discovery> {
        self.discoveries
    }
}

impl ResultSink for CollectingSink {
    fn report(&mut self, discovery: &Discovery) -> Result<(), SinkError> {
        self.discoveries.push(discovery.clone());
        Ok(())
    }
}

/// Forwards discoveries over an `mpsc` channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<Discovery>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: Sender<Discovery>) -> Self {
        Self { tx }
    }
}

impl ResultSink for ChannelSink {
    fn report(&mut self, discovery: &Discovery) -> Result<(), SinkError> {
        self.tx.send(discovery.clone()).map_err(|_| SinkError {
            detail: "result channel receiver dropped".into(),
        })
    }
}

/// Expands every branch and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysExpand;

impl BranchControl for AlwaysExpand {}

/// Shared cooperative cancellation flag.
///
/// Clones share one flag; cancelling any clone stops every search that
/// consults it before its next candidate.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl BranchControl for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
