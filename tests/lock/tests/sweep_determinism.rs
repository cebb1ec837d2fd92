//! In-process sweep determinism.
//!
//! - N=10 sweeps of one configuration yield one bundle digest.
//! - Parallel sweeps are digest-stable regardless of scheduling.
//! - A configuration loaded from disk behaves like the one built in code.
//! - The stored policy snapshot parses back into the configuration it came
//!   from.

use std::num::NonZeroUsize;

use trott_harness::bundle::{POLICY_FILENAME, RESULTS_FILENAME};
use trott_harness::config::SweepConfig;
use trott_harness::runner::run_sweep;
use trott_search::policy::{ParallelPolicy, SearchPolicy};

fn parallel_config() -> SweepConfig {
    SweepConfig::parallel(
        SearchPolicy::new(4, 40),
        ParallelPolicy::new(NonZeroUsize::new(4).unwrap()).with_fan_out_depth(2),
    )
}

#[test]
fn serial_sweep_digest_stable_n10() {
    let config = SweepConfig::serial(SearchPolicy::new(3, 100));
    let first = run_sweep(&config).unwrap();
    for i in 1..=10 {
        let again = run_sweep(&config).unwrap();
        assert_eq!(again.bundle.digest, first.bundle.digest, "run {i} diverged");
        assert_eq!(again.bundle.manifest, first.bundle.manifest, "run {i} diverged");
    }
}

#[test]
fn parallel_sweep_digest_stable_n10() {
    let config = parallel_config();
    let first = run_sweep(&config).unwrap();
    for i in 1..=10 {
        let again = run_sweep(&config).unwrap();
        assert_eq!(again.bundle.digest, first.bundle.digest, "run {i} diverged");
        assert_eq!(again.results, first.results);
    }
}

#[test]
fn config_file_matches_code_built_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.json");
    std::fs::write(
        &path,
        r#"{"max_depth": 4, "max_term": 40, "workers": 4, "fan_out_depth": 2}"#,
    )
    .unwrap();
    let loaded = SweepConfig::load(&path).unwrap();
    assert_eq!(loaded, parallel_config());
    assert_eq!(
        run_sweep(&loaded).unwrap().bundle.digest,
        run_sweep(&parallel_config()).unwrap().bundle.digest
    );
}

#[test]
fn policy_snapshot_round_trips() {
    for config in [SweepConfig::serial(SearchPolicy::new(3, 100)), parallel_config()] {
        let outcome = run_sweep(&config).unwrap();
        let stored = &outcome.bundle.artifact(POLICY_FILENAME).unwrap().content;
        let value: serde_json::Value = serde_json::from_slice(stored).unwrap();
        assert_eq!(SweepConfig::from_policy_snapshot(&value).unwrap(), config);
    }
}

#[test]
fn results_artifact_is_independent_of_execution_mode() {
    let serial = run_sweep(&SweepConfig::serial(SearchPolicy::new(4, 40))).unwrap();
    let pooled = run_sweep(&parallel_config()).unwrap();
    assert_eq!(
        serial.bundle.artifact(RESULTS_FILENAME).unwrap().content,
        pooled.bundle.artifact(RESULTS_FILENAME).unwrap().content
    );
}
