//! Sweep bundles on disk: round trip, offline verification, fail-closed reads,
//! and replay of forged result sets.

use lock_tests::bundle_test_helpers::{
    rebuild_with_artifact, rebuild_with_results, rebuild_without_artifact,
};
use lock_tests::scenarios::sequences;
use trott_harness::bundle::{
    replay_results, verify_bundle, BundleVerifyError, POLICY_FILENAME, REPORT_FILENAME,
    RESULTS_FILENAME, RESULTS_LOG_FILENAME,
};
use trott_harness::bundle_dir::{
    read_bundle_dir, verify_bundle_dir, write_bundle_dir, BundleDirReadError, BundleDirVerifyError,
};
use trott_harness::config::SweepConfig;
use trott_harness::runner::{run_sweep, run_sweep_to_dir};
use trott_search::policy::SearchPolicy;

fn golden_config() -> SweepConfig {
    SweepConfig::serial(SearchPolicy::new(4, 40))
}

#[test]
fn written_bundle_verifies_and_replays() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run_sweep_to_dir(&golden_config(), dir.path()).unwrap();
    let verified = verify_bundle_dir(dir.path()).unwrap();
    assert_eq!(verified.digest, outcome.bundle.digest);
    assert_eq!(verified.replayed, 5);

    let loaded = read_bundle_dir(dir.path()).unwrap();
    assert_eq!(loaded.artifacts, outcome.bundle.artifacts);
}

#[test]
fn digest_independent_of_directory_path() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let nested = b.path().join("deeper").join("bundle");
    run_sweep_to_dir(&golden_config(), a.path()).unwrap();
    run_sweep_to_dir(&golden_config(), &nested).unwrap();
    assert_eq!(
        verify_bundle_dir(a.path()).unwrap().digest,
        verify_bundle_dir(&nested).unwrap().digest
    );
}

#[test]
fn tampered_results_file_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    run_sweep_to_dir(&golden_config(), dir.path()).unwrap();
    std::fs::write(
        dir.path().join(RESULTS_FILENAME),
        br#"{"count":1,"results":[["3"]],"schema_version":"trott_results.v1"}"#,
    )
    .unwrap();
    let err = verify_bundle_dir(dir.path()).unwrap_err();
    assert!(
        matches!(
            err,
            BundleDirVerifyError::Verify(BundleVerifyError::ContentHashMismatch { .. })
        ),
        "{err}"
    );
}

#[test]
fn extra_and_missing_files_fail_closed() {
    let dir = tempfile::tempdir().unwrap();
    run_sweep_to_dir(&golden_config(), dir.path()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    assert!(matches!(
        read_bundle_dir(dir.path()),
        Err(BundleDirReadError::ExtraFile { .. })
    ));

    std::fs::remove_file(dir.path().join("notes.txt")).unwrap();
    std::fs::remove_file(dir.path().join(RESULTS_LOG_FILENAME)).unwrap();
    assert_eq!(
        read_bundle_dir(dir.path()).unwrap_err(),
        BundleDirReadError::MissingArtifact {
            name: RESULTS_LOG_FILENAME.into()
        }
    );
}

#[test]
fn forged_invalid_result_is_caught_by_replay() {
    let outcome = run_sweep(&golden_config()).unwrap();
    let forged = rebuild_with_results(
        &outcome.bundle,
        &sequences(&["3", "3,29", "3,29,5", "3,29,5,8", "10"]),
    );
    verify_bundle(&forged).unwrap();
    assert_eq!(
        replay_results(&forged),
        Err(BundleVerifyError::ReplayRejected {
            sequence: "3,29,5,8".into()
        })
    );

    let dir = tempfile::tempdir().unwrap();
    write_bundle_dir(&forged, dir.path()).unwrap();
    assert!(matches!(
        verify_bundle_dir(dir.path()),
        Err(BundleDirVerifyError::Verify(BundleVerifyError::ReplayRejected { .. }))
    ));
}

#[test]
fn forged_orphan_result_is_caught_by_replay() {
    let outcome = run_sweep(&golden_config()).unwrap();
    let forged = rebuild_with_results(&outcome.bundle, &sequences(&["3", "3,29,5", "10"]));
    verify_bundle(&forged).unwrap();
    assert_eq!(
        replay_results(&forged),
        Err(BundleVerifyError::NotPrefixClosed {
            sequence: "3,29,5".into()
        })
    );
}

#[test]
fn results_without_matching_report_digest_rejected() {
    let outcome = run_sweep(&golden_config()).unwrap();
    let forged = rebuild_with_artifact(
        &outcome.bundle,
        RESULTS_FILENAME,
        br#"{"count":2,"results":[["3"],["10"]],"schema_version":"trott_results.v1"}"#.to_vec(),
        true,
    );
    assert!(matches!(
        verify_bundle(&forged),
        Err(BundleVerifyError::ResultsDigestMismatch { .. })
    ));
}

#[test]
fn report_without_policy_rejected() {
    let outcome = run_sweep(&golden_config()).unwrap();
    let stripped = rebuild_without_artifact(&outcome.bundle, POLICY_FILENAME);
    assert_eq!(
        verify_bundle(&stripped),
        Err(BundleVerifyError::ArtifactMissing {
            name: POLICY_FILENAME.into()
        })
    );
}

#[test]
fn report_is_normative_and_log_is_not() {
    let outcome = run_sweep(&golden_config()).unwrap();
    for name in [POLICY_FILENAME, RESULTS_FILENAME, REPORT_FILENAME] {
        assert!(outcome.bundle.artifact(name).unwrap().normative, "{name}");
    }
    assert!(!outcome.bundle.artifact(RESULTS_LOG_FILENAME).unwrap().normative);
}
