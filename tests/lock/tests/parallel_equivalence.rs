//! Parallel engine equivalence.
//!
//! For every golden sweep, worker count and fan-out depth, the parallel
//! engine reports the same set of sequences and evaluates the same number of
//! candidates as the serial engine. Only report order may differ.

use std::num::NonZeroUsize;
use std::sync::mpsc;

use lock_tests::scenarios::GOLDEN_SWEEPS;
use trott_kernel::cf::term::TermSequence;
use trott_search::parallel::search_parallel;
use trott_search::policy::{ParallelPolicy, SearchPolicy};
use trott_search::search::search;
use trott_search::sink::{ChannelSink, CollectingSink};

fn pool(workers: usize, fan_out_depth: usize) -> ParallelPolicy {
    ParallelPolicy::new(NonZeroUsize::new(workers).unwrap()).with_fan_out_depth(fan_out_depth)
}

#[test]
fn parallel_matches_serial_across_pool_shapes() {
    for golden in GOLDEN_SWEEPS {
        let policy = SearchPolicy::new(golden.max_depth, golden.max_term);
        let mut serial_sink = CollectingSink::new();
        let serial = search(&policy, &mut serial_sink).unwrap();

        for workers in [1, 2, 3, 8] {
            for fan_out_depth in [1, 2, 3] {
                let mut sink = CollectingSink::new();
                let report =
                    search_parallel(&policy, &pool(workers, fan_out_depth), &mut sink).unwrap();
                let mut found = sink.sequences();
                found.sort();
                assert_eq!(
                    found,
                    golden.expected(),
                    "{golden:?} workers={workers} fan_out={fan_out_depth}"
                );
                assert_eq!(report.candidates_evaluated, serial.candidates_evaluated);
                assert_eq!(report.sequences_reported, serial.sequences_reported);
                assert_eq!(report.deepest_level, serial.deepest_level);
                assert!(!report.is_cancelled());
            }
        }
    }
}

#[test]
fn partition_order_is_depth_first_within_each_partition() {
    let policy = SearchPolicy::new(4, 40);
    let mut sink = CollectingSink::new();
    search_parallel(&policy, &pool(4, 1), &mut sink).unwrap();

    let mut by_partition: std::collections::BTreeMap<usize, Vec<(u64, TermSequence)>> =
        std::collections::BTreeMap::new();
    for d in sink.discoveries() {
        by_partition
            .entry(d.partition)
            .or_default()
            .push((d.order, d.sequence.clone()));
    }
    for (partition, mut entries) in by_partition {
        entries.sort_by_key(|(order, _)| *order);
        let sequences: Vec<_> = entries.into_iter().map(|(_, s)| s).collect();
        let mut sorted = sequences.clone();
        sorted.sort();
        assert_eq!(sequences, sorted, "partition {partition}");
    }
}

#[test]
fn channel_sink_carries_every_discovery() {
    let (tx, rx) = mpsc::channel();
    let mut sink = ChannelSink::new(tx);
    let report = search_parallel(&SearchPolicy::new(3, 100), &pool(2, 1), &mut sink).unwrap();
    drop(sink);
    let mut found: Vec<TermSequence> = rx.iter().map(|d| d.sequence).collect();
    found.sort();
    assert_eq!(found, GOLDEN_SWEEPS[1].expected());
    assert_eq!(report.sequences_reported, 5);
}

#[test]
fn repeated_parallel_runs_agree() {
    let policy = SearchPolicy::new(3, 100);
    let mut first = CollectingSink::new();
    search_parallel(&policy, &pool(8, 2), &mut first).unwrap();
    let mut expected = first.sequences();
    expected.sort();
    for _ in 0..10 {
        let mut sink = CollectingSink::new();
        search_parallel(&policy, &pool(8, 2), &mut sink).unwrap();
        let mut found = sink.sequences();
        found.sort();
        assert_eq!(found, expected);
    }
}
