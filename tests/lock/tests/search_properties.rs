//! Structural properties of every search result set.
//!
//! - Every reported sequence re-checks valid on its own.
//! - The result set is prefix-closed.
//! - Serial report order is canonical (sorted) order.
//! - Declined branches are not expanded; cancellation before start reports
//!   nothing.

use std::collections::BTreeSet;

use lock_tests::scenarios::{sequences, GOLDEN_SWEEPS};
use trott_kernel::cf::term::TermSequence;
use trott_kernel::validity::{is_pre_trott, GuardPolicy, ValidityOracle};
use trott_search::contract::BranchControl;
use trott_search::policy::SearchPolicy;
use trott_search::report::SearchReport;
use trott_search::search::{search, search_with};
use trott_search::sink::{AlwaysExpand, CancelToken, CollectingSink};

fn run(policy: &SearchPolicy) -> (Vec<TermSequence>, SearchReport) {
    let mut sink = CollectingSink::new();
    let report = search(policy, &mut sink).unwrap();
    (sink.sequences(), report)
}

#[test]
fn every_result_rechecks_valid() {
    for golden in GOLDEN_SWEEPS {
        let (results, _) = run(&SearchPolicy::new(golden.max_depth, golden.max_term));
        for sequence in &results {
            assert!(is_pre_trott(sequence).unwrap(), "[{sequence}] re-checked invalid");
        }
    }
}

#[test]
fn results_are_prefix_closed() {
    for golden in GOLDEN_SWEEPS {
        let (results, _) = run(&SearchPolicy::new(golden.max_depth, golden.max_term));
        let set: BTreeSet<&TermSequence> = results.iter().collect();
        for sequence in &results {
            let mut ancestor = sequence.parent();
            while let Some(a) = ancestor {
                if a.is_empty() {
                    break;
                }
                assert!(set.contains(&a), "[{a}] missing above [{sequence}]");
                ancestor = a.parent();
            }
        }
    }
}

#[test]
fn serial_report_order_is_canonical() {
    for golden in GOLDEN_SWEEPS {
        let (results, _) = run(&SearchPolicy::new(golden.max_depth, golden.max_term));
        let mut sorted = results.clone();
        sorted.sort();
        assert_eq!(results, sorted);
    }
}

#[test]
fn report_counters_are_consistent() {
    let (results, report) = run(&SearchPolicy::new(4, 40));
    assert_eq!(report.sequences_reported, u64::try_from(results.len()).unwrap());
    assert_eq!(report.deepest_level, 4);
    assert_eq!(report.stack_high_water, 4);
    assert_eq!(report.branches_declined, 0);
    assert_eq!(report.partitions, 0);
}

#[test]
fn results_never_exceed_max_depth_or_max_term() {
    let (results, _) = run(&SearchPolicy::new(3, 100));
    for sequence in &results {
        assert!(sequence.len() <= 3);
        for term in sequence.terms() {
            assert!(term.to_string().parse::<u64>().unwrap() < 100, "[{sequence}]");
        }
    }
}

struct Decline(TermSequence);

impl BranchControl for Decline {
    fn should_expand(&self, sequence: &TermSequence) -> bool {
        sequence != &self.0
    }
}

#[test]
fn declined_branch_is_reported_but_not_expanded() {
    let policy = SearchPolicy::new(4, 40);
    let mut sink = CollectingSink::new();
    let report = search_with(
        &policy,
        &policy.oracle(),
        &Decline("3".parse().unwrap()),
        &mut sink,
    )
    .unwrap();
    assert_eq!(sink.sequences(), sequences(&["3", "10"]));
    assert_eq!(report.branches_declined, 1);
}

#[test]
fn cancelled_before_start_reports_nothing() {
    let token = CancelToken::new();
    token.cancel();
    let policy = SearchPolicy::new(4, 40);
    let mut sink = CollectingSink::new();
    let report = search_with(&policy, &policy.oracle(), &token, &mut sink).unwrap();
    assert!(sink.discoveries().is_empty());
    assert!(report.is_cancelled());
    assert_eq!(report.candidates_evaluated, 0);
}

#[test]
fn guard_policies_agree_on_golden_results() {
    let guards = [
        GuardPolicy::default(),
        GuardPolicy {
            guard_digits: 0,
            ..GuardPolicy::default()
        },
        GuardPolicy {
            guard_digits: 8,
            magnitude_guard: true,
            max_refinements: 1,
        },
        GuardPolicy {
            max_refinements: 0,
            ..GuardPolicy::default()
        },
    ];
    let golden = &GOLDEN_SWEEPS[0];
    for guard in guards {
        let policy = SearchPolicy::new(golden.max_depth, golden.max_term).with_guard(guard);
        let mut sink = CollectingSink::new();
        search_with(&policy, &ValidityOracle::new(guard), &AlwaysExpand, &mut sink).unwrap();
        assert_eq!(sink.sequences(), golden.expected(), "{guard:?}");
    }
}
