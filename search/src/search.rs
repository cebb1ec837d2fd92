//! Serial backtracking engine.
//!
//! Depth-first, ascending-term traversal over an explicit frame stack. A
//! candidate is the current node's sequence with one more term in
//! `[1, max_term)`; admitted candidates are reported first and then expanded
//! while shorter than `max_depth`. Dead candidates are never recursed into.

use tracing::{debug, info, trace};
use trott_kernel::cf::term::{Term, TermSequence};

use crate::contract::{BranchControl, BranchOracle, ResultSink, SinkError};
use crate::error::SearchError;
use crate::node::{Discovery, Frame};
use crate::policy::SearchPolicy;
use crate::report::{SearchReport, TerminationReason};
use crate::sink::AlwaysExpand;

/// Run the search described by `policy` with its own validity oracle.
///
/// # Errors
///
/// See [`search_with`].
pub fn search<S: ResultSink + ?Sized>(
    policy: &SearchPolicy,
    sink: &mut S,
) -> Result<SearchReport, SearchError> {
    search_with(policy, &policy.oracle(), &AlwaysExpand, sink)
}

/// Run the search with an explicit oracle and branch control.
///
/// Discoveries reach `sink` in discovery order: ascending term, depth-first,
/// every sequence before any of its descendants.
///
/// # Errors
///
/// - [`SearchError::InvalidPolicy`] before anything runs, if the policy is
///   malformed or its non-empty starting prefix is not admitted.
/// - [`SearchError::Kernel`] if the oracle fails on any candidate.
/// - [`SearchError::SinkFailed`] if the sink refuses a discovery.
pub fn search_with<O, C, S>(
    policy: &SearchPolicy,
    oracle: &O,
    control: &C,
    sink: &mut S,
) -> Result<SearchReport, SearchError>
where
    O: BranchOracle + ?Sized,
    C: BranchControl + ?Sized,
    S: ResultSink + ?Sized,
{
    preflight(policy, oracle)?;
    info!(
        max_depth = policy.max_depth,
        max_term = policy.max_term,
        prefix = %policy.starting_prefix,
        "search started"
    );
    let mut emit = |discovery: Discovery| sink.report(&discovery).map_err(sink_failed);
    let report = traverse(
        policy.starting_prefix.clone(),
        policy.max_depth,
        policy.max_term,
        oracle,
        control,
        0,
        &mut emit,
    )?;
    log_finished(&report);
    Ok(report)
}

/// Structural policy checks plus admission of a non-empty starting prefix.
pub(crate) fn preflight<O: BranchOracle + ?Sized>(
    policy: &SearchPolicy,
    oracle: &O,
) -> Result<(), SearchError> {
    policy.validate()?;
    if !policy.starting_prefix.is_empty() && !oracle.admits(&policy.starting_prefix)? {
        return Err(SearchError::InvalidPolicy {
            detail: format!(
                "starting prefix [{}] is not a pre-Trott prefix",
                policy.starting_prefix
            ),
        });
    }
    Ok(())
}

pub(crate) fn sink_failed(e: SinkError) -> SearchError {
    SearchError::SinkFailed { detail: e.detail }
}

pub(crate) fn log_finished(report: &SearchReport) {
    info!(
        termination = report.termination.as_str(),
        candidates = report.candidates_evaluated,
        reported = report.sequences_reported,
        declined = report.branches_declined,
        partitions = report.partitions,
        "search finished"
    );
}

/// Explore below `root` (which is not itself evaluated), expanding nodes
/// shorter than `expand_below`.
pub(crate) fn traverse<O, C, E>(
    root: TermSequence,
    expand_below: usize,
    max_term: u64,
    oracle: &O,
    control: &C,
    partition: usize,
    emit: &mut E,
) -> Result<SearchReport, SearchError>
where
    O: BranchOracle + ?Sized,
    C: BranchControl + ?Sized,
    E: FnMut(Discovery) -> Result<(), SearchError>,
{
    let mut report = SearchReport::new();
    if control.is_cancelled() {
        report.termination = TerminationReason::Cancelled;
        return Ok(report);
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut order: u64 = 0;
    push_frame(&mut stack, root, expand_below, control, &mut report);

    while let Some(frame) = stack.last_mut() {
        if control.is_cancelled() {
            debug!(partition, "cancelled");
            report.termination = TerminationReason::Cancelled;
            return Ok(report);
        }
        if frame.next_term >= max_term {
            stack.pop();
            continue;
        }
        let term = Term::new(frame.next_term)?;
        frame.next_term += 1;
        let candidate = frame.sequence.extended(term);

        report.candidates_evaluated += 1;
        let alive = oracle.admits(&candidate)?;
        trace!(sequence = %candidate, alive, "candidate");
        if !alive {
            continue;
        }

        debug!(sequence = %candidate, partition, order, "reported");
        report.sequences_reported += 1;
        report.deepest_level = report.deepest_level.max(candidate.len());
        emit(Discovery {
            sequence: candidate.clone(),
            partition,
            order,
        })?;
        order += 1;
        push_frame(&mut stack, candidate, expand_below, control, &mut report);
    }
    Ok(report)
}

fn push_frame<C: BranchControl + ?Sized>(
    stack: &mut Vec<Frame>,
    sequence: TermSequence,
    expand_below: usize,
    control: &C,
    report: &mut SearchReport,
) {
    if sequence.len() >= expand_below {
        return;
    }
    if !control.should_expand(&sequence) {
        debug!(sequence = %sequence, "branch declined");
        report.branches_declined += 1;
        return;
    }
    stack.push(Frame::new(sequence));
    report.stack_high_water = report.stack_high_water.max(stack.len());
}
