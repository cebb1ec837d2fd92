//! Known-answer locks for the numeric core and the serial engine.
//!
//! - Digit counter, target formatter and evaluator against hand-checked values.
//! - Predicate scenarios, including the `[3, 33…329]` family.
//! - Golden sweeps: complete result sets and candidate counts.

use lock_tests::scenarios::{sequences, trott_family, GOLDEN_SWEEPS, PREDICATE_SCENARIOS};
use trott_kernel::cf::digits::{digit_count, digit_count_raw};
use trott_kernel::cf::evaluate::evaluate;
use trott_kernel::cf::target::trott_target;
use trott_kernel::cf::term::TermSequence;
use trott_kernel::numeric::precision::Precision;
use trott_kernel::validity::{is_pre_trott, is_pre_trott_raw, Decision, ValidityOracle};
use trott_search::policy::SearchPolicy;
use trott_search::search::search;
use trott_search::sink::CollectingSink;

fn seq(text: &str) -> TermSequence {
    text.parse().unwrap()
}

// --- components ---

#[test]
fn digit_counter_sums_term_widths() {
    assert_eq!(digit_count_raw(&[100, 5, 7, 99]).unwrap(), 7);
    assert_eq!(digit_count(&TermSequence::empty()), 0);
    assert_eq!(digit_count(&trott_family(18)), 21);
}

#[test]
fn formatter_concatenates_terms() {
    assert_eq!(trott_target(&seq("3,29,5,7")), "0.32957");
    assert_eq!(trott_target(&TermSequence::empty()), "0.");
}

#[test]
fn evaluator_matches_known_expansion() {
    let value = evaluate(&seq("3,29,5,7"), Precision::new(30).unwrap()).unwrap();
    assert!(
        value.to_plain_string().starts_with("0.32957039824396362"),
        "got {value}"
    );
    for digits in [1, 7, 64] {
        let zero = evaluate(&TermSequence::empty(), Precision::new(digits).unwrap()).unwrap();
        assert!(zero.is_zero());
    }
}

#[test]
fn evaluation_and_rendering_are_idempotent() {
    let p = Precision::new(40).unwrap();
    let s = seq("3,29,54");
    let a = evaluate(&s, p).unwrap();
    let b = evaluate(&s, p).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_plain_string(), b.to_plain_string());
}

// --- predicate ---

#[test]
fn predicate_scenarios() {
    for &(text, expected) in PREDICATE_SCENARIOS {
        assert_eq!(
            is_pre_trott(&seq(text)).unwrap(),
            expected,
            "[{text}] expected valid={expected}"
        );
    }
}

#[test]
fn predicate_on_raw_integers() {
    assert!(is_pre_trott_raw(&[3, 29, 5, 7]).unwrap());
    assert!(!is_pre_trott_raw(&[3, 29, 5, 8]).unwrap());
    assert!(is_pre_trott_raw(&[3, 0]).is_err());
}

#[test]
fn trott_family_valid_from_two_to_twenty_digits() {
    for k in 0..=18 {
        let member = trott_family(k);
        let width = member.terms()[1].to_string().len();
        assert_eq!(width, k + 2);
        assert!(is_pre_trott(&member).unwrap(), "[{member}] should be valid");
    }
}

#[test]
fn verdict_explains_a_rejection() {
    let verdict = ValidityOracle::default().check(&seq("3,29,5,8")).unwrap();
    assert!(!verdict.valid);
    assert_eq!(verdict.target, "0.32958");
    assert_eq!(verdict.rendered_prefix, "0.32957");
    assert_eq!(verdict.decision, Decision::Certified);
}

#[test]
fn terminating_expansion_is_decided_exactly() {
    let verdict = ValidityOracle::default().check(&seq("10")).unwrap();
    assert!(verdict.valid);
    assert_eq!(verdict.decision, Decision::Exact);
}

// --- golden sweeps ---

#[test]
fn golden_sweeps_serial() {
    for golden in GOLDEN_SWEEPS {
        let mut sink = CollectingSink::new();
        let report = search(
            &SearchPolicy::new(golden.max_depth, golden.max_term),
            &mut sink,
        )
        .unwrap();
        assert_eq!(
            sink.sequences(),
            golden.expected(),
            "max_depth={} max_term={}",
            golden.max_depth,
            golden.max_term
        );
        if let Some(candidates) = golden.candidates {
            assert_eq!(report.candidates_evaluated, candidates, "{golden:?}");
        }
        assert!(!report.is_cancelled());
    }
}

#[test]
fn resuming_from_a_prefix_explores_only_its_subtree() {
    let policy = SearchPolicy::new(4, 40).with_prefix(seq("3,29"));
    let mut sink = CollectingSink::new();
    search(&policy, &mut sink).unwrap();
    assert_eq!(sink.sequences(), sequences(&["3,29,5", "3,29,5,7"]));
}
