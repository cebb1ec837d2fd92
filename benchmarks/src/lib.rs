//! Shared regimes and helpers for the benchmark suites.

use std::num::NonZeroUsize;

use trott_harness::config::SweepConfig;
use trott_kernel::cf::term::TermSequence;
use trott_kernel::digest::hash::{canonical_json_hash, ContentHash, HashDomain};
use trott_search::policy::{ParallelPolicy, SearchPolicy};
use trott_search::report::SearchReport;
use trott_search::sink::CollectingSink;

/// A named sweep shape.
#[derive(Debug, Clone)]
pub struct Regime {
    pub name: &'static str,
    pub config: SweepConfig,
}

/// Serial regimes, smallest first.
///
/// # Panics
///
/// Never; the prefix literal is well-formed.
#[must_use]
pub fn serial_regimes() -> Vec<Regime> {
    vec![
        Regime {
            name: "shallow_wide",
            config: SweepConfig::serial(SearchPolicy::new(2, 200)),
        },
        Regime {
            name: "golden_4x40",
            config: SweepConfig::serial(SearchPolicy::new(4, 40)),
        },
        Regime {
            name: "deep_narrow",
            config: SweepConfig::serial(SearchPolicy::new(6, 60)),
        },
        Regime {
            name: "resumed_3_29",
            config: SweepConfig::serial(
                SearchPolicy::new(6, 200).with_prefix(
                    "3,29"
                        .parse()
                        .unwrap_or_else(|e| panic!("bad prefix: {e}")),
                ),
            ),
        },
    ]
}

/// `policy` under a pool of `workers` split at the first level.
///
/// # Panics
///
/// Panics if `workers` is zero.
#[must_use]
pub fn pooled(policy: SearchPolicy, workers: usize) -> SweepConfig {
    let workers = NonZeroUsize::new(workers).unwrap_or_else(|| panic!("workers must be nonzero"));
    SweepConfig::parallel(policy, ParallelPolicy::new(workers))
}

/// Digest identifying a regime's input, for correlating saved results.
#[must_use]
pub fn regime_input_digest(regime: &Regime) -> ContentHash {
    let value = serde_json::json!({
        "name": regime.name,
        "policy": regime.config.to_json_value(),
    });
    canonical_json_hash(HashDomain::BenchInput, &value)
        .unwrap_or_else(|e| panic!("regime {} is not canonicalizable: {e}", regime.name))
}

/// Serial engine only: no bundle, no log.
///
/// # Panics
///
/// Panics if the search fails. Benchmark runs are expected to succeed.
#[must_use]
pub fn run_search_only(policy: &SearchPolicy) -> (Vec<TermSequence>, SearchReport) {
    let mut sink = CollectingSink::new();
    let report = trott_search::search::search(policy, &mut sink)
        .unwrap_or_else(|e| panic!("search should succeed in benchmarks: {e}"));
    (sink.sequences(), report)
}
