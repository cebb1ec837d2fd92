//! Bundle surgery for negative tests.
//!
//! The rebuild helpers keep every digest binding consistent, so a test that
//! forges a result set exercises replay rather than a digest mismatch.

use trott_harness::bundle::{
    build_bundle, results_to_json, ArtifactBundle, REPORT_FILENAME, RESULTS_FILENAME,
    RESULTS_LOG_FILENAME,
};
use trott_harness::results_log::format_line;
use trott_kernel::cf::term::TermSequence;
use trott_kernel::digest::canon::canonical_json_bytes;
use trott_kernel::digest::hash::{canonical_hash, HashDomain};

/// Rebuild `bundle` with one artifact's content replaced (or added).
///
/// # Panics
///
/// Panics if the rebuilt bundle cannot be built.
#[must_use]
pub fn rebuild_with_artifact(
    bundle: &ArtifactBundle,
    name: &str,
    content: Vec<u8>,
    normative: bool,
) -> ArtifactBundle {
    let mut inputs: Vec<(String, Vec<u8>, bool)> = bundle
        .artifacts
        .values()
        .filter(|a| a.name != name)
        .map(|a| (a.name.clone(), a.content.clone(), a.normative))
        .collect();
    inputs.push((name.to_string(), content, normative));
    build_bundle(inputs).unwrap_or_else(|e| panic!("rebuild failed: {e}"))
}

/// Rebuild `bundle` without the named artifact.
///
/// # Panics
///
/// Panics if the rebuilt bundle cannot be built.
#[must_use]
pub fn rebuild_without_artifact(bundle: &ArtifactBundle, name: &str) -> ArtifactBundle {
    let inputs = bundle
        .artifacts
        .values()
        .filter(|a| a.name != name)
        .map(|a| (a.name.clone(), a.content.clone(), a.normative))
        .collect();
    build_bundle(inputs).unwrap_or_else(|e| panic!("rebuild failed: {e}"))
}

/// Replace the result set, rewriting `results.json`, `results.jsonl` and the
/// report's `results_digest` so that integrity verification still passes.
///
/// `results` must already be in canonical order.
///
/// # Panics
///
/// Panics if the bundle has no parseable report.
#[must_use]
pub fn rebuild_with_results(bundle: &ArtifactBundle, results: &[TermSequence]) -> ArtifactBundle {
    let results_bytes =
        canonical_json_bytes(&results_to_json(results)).unwrap_or_else(|e| panic!("{e}"));
    let log: String = results
        .iter()
        .map(|s| format!("{}\n", format_line(s)))
        .collect();

    let report = bundle
        .artifact(REPORT_FILENAME)
        .unwrap_or_else(|| panic!("bundle has no {REPORT_FILENAME}"));
    let mut report: serde_json::Value =
        serde_json::from_slice(&report.content).unwrap_or_else(|e| panic!("{e}"));
    report["results_digest"] = serde_json::Value::String(
        canonical_hash(HashDomain::ResultSet, &results_bytes)
            .as_str()
            .to_string(),
    );
    let report_bytes = canonical_json_bytes(&report).unwrap_or_else(|e| panic!("{e}"));

    let rebuilt = rebuild_with_artifact(bundle, RESULTS_FILENAME, results_bytes, true);
    let rebuilt = rebuild_with_artifact(&rebuilt, REPORT_FILENAME, report_bytes, true);
    rebuild_with_artifact(&rebuilt, RESULTS_LOG_FILENAME, log.into_bytes(), false)
}
