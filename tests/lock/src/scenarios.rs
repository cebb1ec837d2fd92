//! Known answers: predicate scenarios and golden sweeps.

use trott_kernel::cf::term::TermSequence;

/// `(sequence, expected validity)` pairs with hand-checked answers.
pub const PREDICATE_SCENARIOS: &[(&str, bool)] = &[
    ("3", true),
    ("3,29", true),
    ("3,29,5", true),
    ("3,29,5,7", true),
    ("3,29,5,8", false),
    ("3,30", false),
    ("3,29,54", true),
    ("3,333329", true),
    ("3,3333329", true),
    ("3,33333329", true),
    ("10", true),
    ("1", false),
    ("2", false),
];

/// A sweep from the empty prefix with its complete, ordered result set.
#[derive(Debug, Clone, Copy)]
pub struct GoldenSweep {
    pub max_depth: usize,
    pub max_term: u64,
    pub results: &'static [&'static str],
    /// Predicate calls of a serial run, where pinned.
    pub candidates: Option<u64>,
}

pub const GOLDEN_SWEEPS: &[GoldenSweep] = &[
    GoldenSweep {
        max_depth: 4,
        max_term: 40,
        results: &["3", "3,29", "3,29,5", "3,29,5,7", "10"],
        candidates: Some(195),
    },
    GoldenSweep {
        max_depth: 3,
        max_term: 100,
        results: &["3", "3,29", "3,29,5", "3,29,54", "10"],
        candidates: Some(396),
    },
    GoldenSweep {
        max_depth: 2,
        max_term: 30,
        results: &["3", "3,29", "10"],
        candidates: Some(87),
    },
    GoldenSweep {
        max_depth: 1,
        max_term: 40,
        results: &["3", "10"],
        candidates: Some(39),
    },
    GoldenSweep {
        max_depth: 6,
        max_term: 12,
        results: &["3", "10"],
        candidates: None,
    },
];

impl GoldenSweep {
    /// # Panics
    ///
    /// Panics if a golden entry does not parse (a fixture bug).
    #[must_use]
    pub fn expected(&self) -> Vec<TermSequence> {
        sequences(self.results)
    }
}

/// # Panics
///
/// Panics if an entry does not parse.
#[must_use]
pub fn sequences(list: &[&str]) -> Vec<TermSequence> {
    list.iter()
        .map(|s| s.parse().unwrap_or_else(|e| panic!("bad fixture {s:?}: {e}")))
        .collect()
}

/// `[3, 33…329]` with `k` threes before the `29`.
///
/// # Panics
///
/// Never for the literals this builds.
#[must_use]
pub fn trott_family(k: usize) -> TermSequence {
    format!("3,{}29", "3".repeat(k))
        .parse()
        .unwrap_or_else(|e| panic!("family member {k}: {e}"))
}
