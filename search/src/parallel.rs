//! Parallel search over a scoped worker pool.
//!
//! The calling thread first runs the serial engine down to `fan_out_depth`,
//! reporting what it finds; sequences discovered at exactly that depth become
//! partition roots. Workers claim roots through a shared atomic index, explore
//! each subtree serially, and send discoveries over an `mpsc` channel back to
//! the calling thread, which is the only writer to the sink.
//!
//! Report order across partitions is not deterministic. Every discovery
//! carries `(partition, order)`; sorting by sequence recovers serial order.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::{debug, info, warn};
use trott_kernel::cf::term::TermSequence;

use crate::contract::{BranchControl, BranchOracle, ResultSink};
use crate::error::SearchError;
use crate::node::Discovery;
use crate::policy::{ParallelPolicy, SearchPolicy};
use crate::report::{SearchReport, TerminationReason};
use crate::search::{log_finished, preflight, sink_failed, traverse};
use crate::sink::AlwaysExpand;

enum WorkerMessage {
    Found(Discovery),
    Finished(SearchReport),
    Failed(SearchError),
}

/// Caller's control plus the pool's internal abort flag.
struct Abortable<'a, C: ?Sized> {
    inner: &'a C,
    abort: &'a AtomicBool,
}

impl<C: BranchControl + ?Sized> BranchControl for Abortable<'_, C> {
    fn should_expand(&self, sequence: &TermSequence) -> bool {
        self.inner.should_expand(sequence)
    }

    fn is_cancelled(&self) -> bool {
        self.abort.load(Ordering::SeqCst) || self.inner.is_cancelled()
    }
}

/// Parallel counterpart of [`crate::search::search`].
///
/// # Errors
///
/// See [`search_parallel_with`].
pub fn search_parallel<S: ResultSink + ?Sized>(
    policy: &SearchPolicy,
    parallel: &ParallelPolicy,
    sink: &mut S,
) -> Result<SearchReport, SearchError> {
    search_parallel_with(policy, parallel, &policy.oracle(), &AlwaysExpand, sink)
}

/// Run the search across `parallel.workers` scoped threads.
///
/// The set of reported sequences and the candidate count equal those of the
/// serial engine; only the report order differs.
///
/// # Errors
///
/// Everything [`crate::search::search_with`] returns, plus
/// [`SearchError::InvalidPolicy`] for a fan-out depth not above the starting
/// prefix and [`SearchError::WorkerPanicked`] if a worker panics. The first
/// failure cancels the remaining workers.
pub fn search_parallel_with<O, C, S>(
    policy: &SearchPolicy,
    parallel: &ParallelPolicy,
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
    parallel.validate(policy)?;
    let split = parallel.fan_out_depth.min(policy.max_depth);
    info!(
        max_depth = policy.max_depth,
        max_term = policy.max_term,
        prefix = %policy.starting_prefix,
        workers = parallel.workers.get(),
        fan_out_depth = split,
        "parallel search started"
    );

    let mut roots: Vec<TermSequence> = Vec::new();
    let mut emit = |discovery: Discovery| {
        if discovery.depth() == split && split < policy.max_depth {
            roots.push(discovery.sequence.clone());
        }
        sink.report(&discovery).map_err(sink_failed)
    };
    let mut report = traverse(
        policy.starting_prefix.clone(),
        split,
        policy.max_term,
        oracle,
        control,
        0,
        &mut emit,
    )?;
    if report.is_cancelled() || roots.is_empty() {
        log_finished(&report);
        return Ok(report);
    }

    let abort = AtomicBool::new(false);
    let guarded = Abortable {
        inner: control,
        abort: &abort,
    };
    let next_root = AtomicUsize::new(0);
    let workers = parallel.workers.get().min(roots.len());
    let mut first_error: Option<SearchError> = None;

    thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        for _ in 0..workers {
            let tx = tx.clone();
            let (roots, next_root, guarded, abort) = (&roots, &next_root, &guarded, &abort);
            scope.spawn(move || {
                run_worker(roots, next_root, policy, oracle, guarded, abort, &tx);
            });
        }
        drop(tx);

        for message in rx {
            match message {
                WorkerMessage::Found(discovery) => {
                    if first_error.is_some() {
                        continue;
                    }
                    if let Err(e) = sink.report(&discovery) {
                        abort.store(true, Ordering::SeqCst);
                        first_error = Some(sink_failed(e));
                    }
                }
                WorkerMessage::Finished(part) => {
                    report.absorb(&part);
                    report.partitions += 1;
                }
                WorkerMessage::Failed(e) => {
                    abort.store(true, Ordering::SeqCst);
                    warn!(error = %e, "worker failed");
                    first_error.get_or_insert(e);
                }
            }
        }
    });

    if let Some(e) = first_error {
        return Err(e);
    }
    if report.partitions < roots.len() {
        report.termination = TerminationReason::Cancelled;
    }
    log_finished(&report);
    Ok(report)
}

fn run_worker<O, C>(
    roots: &[TermSequence],
    next_root: &AtomicUsize,
    policy: &SearchPolicy,
    oracle: &O,
    control: &C,
    abort: &AtomicBool,
    tx: &Sender<WorkerMessage>,
) where
    O: BranchOracle + ?Sized,
    C: BranchControl + ?Sized,
{
    while !control.is_cancelled() {
        let index = next_root.fetch_add(1, Ordering::SeqCst);
        let Some(root) = roots.get(index) else {
            break;
        };
        let partition = index + 1;
        debug!(partition, root = %root, "partition started");

        let mut emit = |discovery: Discovery| {
            tx.send(WorkerMessage::Found(discovery))
                .map_err(|_| SearchError::SinkFailed {
                    detail: "result channel closed".into(),
                })
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            traverse(
                root.clone(),
                policy.max_depth,
                policy.max_term,
                oracle,
                control,
                partition,
                &mut emit,
            )
        }));
        let message = match outcome {
            Ok(Ok(part)) => WorkerMessage::Finished(part),
            Ok(Err(e)) => WorkerMessage::Failed(e),
            Err(_) => WorkerMessage::Failed(SearchError::WorkerPanicked { partition }),
        };
        let failed = matches!(message, WorkerMessage::Failed(_));
        if failed {
            abort.store(true, Ordering::SeqCst);
        }
        if tx.send(message).is_err() || failed {
            break;
        }
    }
}
