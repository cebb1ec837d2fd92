//! In-memory artifact bundle: the output of a sweep.
//!
//! No file I/O in this module (see [`crate::bundle_dir`] for persistence).
//!
//! # Normative vs observational artifacts
//!
//! Each artifact is tagged `normative` (participates in the bundle digest) or
//! observational (listed in the manifest, excluded from the digest). A sweep
//! bundle carries:
//!
//! | artifact | normative | content |
//! |---|---|---|
//! | `policy.json` | yes | policy snapshot |
//! | `results.json` | yes | reported sequences in canonical order |
//! | `search_report.json` | yes | counters plus policy/results digests |
//! | `results.jsonl` | no | the results log, in report order |
//!
//! The bundle digest is computed over the **digest basis**: a canonical JSON
//! projection of normative artifact hashes only.

use std::collections::{BTreeMap, BTreeSet};

use trott_kernel::cf::term::TermSequence;
use trott_kernel::digest::canon::canonical_json_bytes;
use trott_kernel::digest::hash::{canonical_hash, ContentHash, HashDomain};
use trott_search::contract::BranchOracle;

use crate::config::SweepConfig;
use crate::results_log::parse_results_log;

pub const POLICY_FILENAME: &str = "policy.json";
pub const RESULTS_FILENAME: &str = "results.json";
pub const REPORT_FILENAME: &str = "search_report.json";
pub const RESULTS_LOG_FILENAME: &str = "results.jsonl";

pub const RESULTS_SCHEMA_VERSION: &str = "trott_results.v1";
pub const REPORT_SCHEMA_VERSION: &str = "trott_search_report.v1";

/// A single artifact in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// Logical filename (e.g. `"results.json"`).
    pub name: String,
    pub content: Vec<u8>,
    /// `canonical_hash(BundleArtifact, content)`.
    pub content_hash: ContentHash,
    /// Whether this artifact participates in the bundle digest.
    pub normative: bool,
}

/// The complete artifact bundle of a sweep.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    /// Artifacts by logical name, sorted.
    pub artifacts: BTreeMap<String, BundleArtifact>,
    /// Canonical JSON listing all artifacts with normative flags.
    pub manifest: Vec<u8>,
    /// Canonical JSON listing normative artifact hashes only.
    pub digest_basis: Vec<u8>,
    /// `canonical_hash(BundleDigest, digest_basis)`.
    pub digest: ContentHash,
}

impl ArtifactBundle {
    #[must_use]
    pub fn artifact(&self, name: &str) -> Option<&BundleArtifact> {
        self.artifacts.get(name)
    }
}

/// Error building a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleBuildError {
    CanonError { detail: String },
    DuplicateArtifact { name: String },
}

impl std::fmt::Display for BundleBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CanonError { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::DuplicateArtifact { name } => write!(f, "duplicate artifact name: {name}"),
        }
    }
}

impl std::error::Error for BundleBuildError {}

/// Build a bundle from `(name, content, normative)` triples.
///
/// # Errors
///
/// Returns [`BundleBuildError`] if two artifacts share a name or canonical
/// JSON serialization fails.
pub fn build_bundle(
    artifacts: Vec<(String, Vec<u8>, bool)>,
) -> Result<ArtifactBundle, BundleBuildError> {
    let mut artifact_map = BTreeMap::new();
    for (name, content, normative) in artifacts {
        if artifact_map.contains_key(&name) {
            return Err(BundleBuildError::DuplicateArtifact { name });
        }
        let content_hash = canonical_hash(HashDomain::BundleArtifact, &content);
        artifact_map.insert(
            name.clone(),
            BundleArtifact {
                name,
                content,
                content_hash,
                normative,
            },
        );
    }

    let manifest = compute_manifest_bytes(&artifact_map)
        .map_err(|detail| BundleBuildError::CanonError { detail })?;
    let digest_basis = compute_digest_basis_bytes(&artifact_map)
        .map_err(|detail| BundleBuildError::CanonError { detail })?;
    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);

    Ok(ArtifactBundle {
        artifacts: artifact_map,
        manifest,
        digest_basis,
        digest,
    })
}

/// Error from bundle integrity verification or result replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleVerifyError {
    ContentHashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },
    ManifestMismatch,
    ManifestNotCanonical,
    DigestBasisMismatch,
    DigestBasisNotCanonical,
    DigestMismatch { expected: String, actual: String },
    /// A normative JSON artifact is not in canonical form.
    ArtifactNotCanonical { artifact: String },
    /// An artifact required by another artifact's bindings is absent.
    ArtifactMissing { name: String },
    ReportParseError { detail: String },
    ReportFieldMissing { field: String },
    PolicyDigestMismatch { declared: String, recomputed: String },
    ResultsDigestMismatch { declared: String, recomputed: String },
    /// `results.json` does not parse, or its count is wrong.
    ResultsMalformed { detail: String },
    /// `results.jsonl` does not hold the same sequences as `results.json`.
    ResultsLogMismatch { detail: String },
    /// `policy.json` could not be turned back into a policy.
    PolicyUnreadable { detail: String },
    /// Replaying the validity predicate rejected a reported sequence.
    ReplayRejected { sequence: String },
    /// The validity predicate failed during replay.
    ReplayFailed { detail: String },
    /// A result's parent is neither reported nor the starting prefix.
    NotPrefixClosed { sequence: String },
    CanonError { detail: String },
}

impl std::fmt::Display for BundleVerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentHashMismatch {
                artifact,
                expected,
                actual,
            } => write!(
                f,
                "content hash mismatch for {artifact}: expected {expected}, got {actual}"
            ),
            Self::ManifestMismatch => write!(f, "manifest does not match artifacts"),
            Self::ManifestNotCanonical => write!(f, "manifest is not canonical JSON"),
            Self::DigestBasisMismatch => write!(f, "digest basis does not match artifacts"),
            Self::DigestBasisNotCanonical => write!(f, "digest basis is not canonical JSON"),
            Self::DigestMismatch { expected, actual } => {
                write!(f, "bundle digest mismatch: expected {expected}, got {actual}")
            }
            Self::ArtifactNotCanonical { artifact } => {
                write!(f, "normative artifact {artifact} is not canonical JSON")
            }
            Self::ArtifactMissing { name } => write!(f, "required artifact missing: {name}"),
            Self::ReportParseError { detail } => write!(f, "report parse error: {detail}"),
            Self::ReportFieldMissing { field } => write!(f, "report field missing: {field}"),
            Self::PolicyDigestMismatch {
                declared,
                recomputed,
            } => write!(
                f,
                "policy digest mismatch: declared {declared}, recomputed {recomputed}"
            ),
            Self::ResultsDigestMismatch {
                declared,
                recomputed,
            } => write!(
                f,
                "results digest mismatch: declared {declared}, recomputed {recomputed}"
            ),
            Self::ResultsMalformed { detail } => write!(f, "malformed results: {detail}"),
            Self::ResultsLogMismatch { detail } => write!(f, "results log mismatch: {detail}"),
            Self::PolicyUnreadable { detail } => write!(f, "unreadable policy: {detail}"),
            Self::ReplayRejected { sequence } => {
                write!(f, "replay rejected reported sequence [{sequence}]")
            }
            Self::ReplayFailed { detail } => write!(f, "replay failed: {detail}"),
            Self::NotPrefixClosed { sequence } => {
                write!(f, "parent of [{sequence}] was not reported")
            }
            Self::CanonError { detail } => write!(f, "canonical JSON error: {detail}"),
        }
    }
}

impl std::error::Error for BundleVerifyError {}

/// Verify the internal consistency of a bundle.
///
/// Pure integrity check (no predicate evaluation; see [`replay_results`]):
///
/// 1. Each artifact's `content_hash` matches its content.
/// 2. `manifest` and `digest_basis` match their recomputed projections and
///    are canonical JSON.
/// 3. `digest` matches `canonical_hash(BundleDigest, digest_basis)`.
/// 4. Normative `.json` artifacts are canonical JSON.
/// 5. If `search_report.json` exists, its `policy_digest` and
///    `results_digest` bind `policy.json` and `results.json`, which must exist.
/// 6. If `results.jsonl` exists next to `results.json`, both hold the same
///    sequences.
///
/// # Errors
///
/// Returns the first [`BundleVerifyError`] encountered.
pub fn verify_bundle(bundle: &ArtifactBundle) -> Result<(), BundleVerifyError> {
    for artifact in bundle.artifacts.values() {
        let recomputed = canonical_hash(HashDomain::BundleArtifact, &artifact.content);
        if recomputed != artifact.content_hash {
            return Err(BundleVerifyError::ContentHashMismatch {
                artifact: artifact.name.clone(),
                expected: artifact.content_hash.as_str().to_string(),
                actual: recomputed.as_str().to_string(),
            });
        }
    }

    let expected_manifest = compute_manifest_bytes(&bundle.artifacts)
        .map_err(|detail| BundleVerifyError::CanonError { detail })?;
    if expected_manifest != bundle.manifest {
        return Err(BundleVerifyError::ManifestMismatch);
    }
    verify_canonical_json(&bundle.manifest)
        .map_err(|()| BundleVerifyError::ManifestNotCanonical)?;

    let expected_basis = compute_digest_basis_bytes(&bundle.artifacts)
        .map_err(|detail| BundleVerifyError::CanonError { detail })?;
    if expected_basis != bundle.digest_basis {
        return Err(BundleVerifyError::DigestBasisMismatch);
    }
    verify_canonical_json(&bundle.digest_basis)
        .map_err(|()| BundleVerifyError::DigestBasisNotCanonical)?;

    let recomputed_digest = canonical_hash(HashDomain::BundleDigest, &bundle.digest_basis);
    if recomputed_digest != bundle.digest {
        return Err(BundleVerifyError::DigestMismatch {
            expected: bundle.digest.as_str().to_string(),
            actual: recomputed_digest.as_str().to_string(),
        });
    }

    for artifact in bundle.artifacts.values() {
        let is_json = std::path::Path::new(&artifact.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if artifact.normative && is_json {
            verify_canonical_json(&artifact.content).map_err(|()| {
                BundleVerifyError::ArtifactNotCanonical {
                    artifact: artifact.name.clone(),
                }
            })?;
        }
    }

    verify_report_bindings(bundle)?;
    verify_results_log(bundle)?;
    Ok(())
}

/// Re-check every reported sequence against the bundle's own policy.
///
/// Proves that each result extends the starting prefix, is admitted by the
/// validity predicate under the recorded guard policy, and that the result
/// set is prefix-closed. Returns the number of sequences replayed.
///
/// # Errors
///
/// Returns the first [`BundleVerifyError`] encountered.
pub fn replay_results(bundle: &ArtifactBundle) -> Result<usize, BundleVerifyError> {
    let policy = required(bundle, POLICY_FILENAME)?;
    let policy_value: serde_json::Value =
        serde_json::from_slice(&policy.content).map_err(|e| BundleVerifyError::PolicyUnreadable {
            detail: e.to_string(),
        })?;
    let config = SweepConfig::from_policy_snapshot(&policy_value).map_err(|e| {
        BundleVerifyError::PolicyUnreadable {
            detail: e.to_string(),
        }
    })?;
    let results = results_from_artifact(&required(bundle, RESULTS_FILENAME)?.content)?;

    let oracle = config.search.oracle();
    let prefix = &config.search.starting_prefix;
    let reported: BTreeSet<&TermSequence> = results.iter().collect();
    for sequence in &results {
        if !prefix.is_prefix_of(sequence) || sequence.len() <= prefix.len() {
            return Err(BundleVerifyError::ResultsMalformed {
                detail: format!("[{sequence}] does not extend the starting prefix [{prefix}]"),
            });
        }
        let admitted = oracle
            .admits(sequence)
            .map_err(|e| BundleVerifyError::ReplayFailed {
                detail: e.to_string(),
            })?;
        if !admitted {
            return Err(BundleVerifyError::ReplayRejected {
                sequence: sequence.to_string(),
            });
        }
        let parent = sequence.parent().unwrap_or_default();
        if parent != *prefix && !reported.contains(&parent) {
            return Err(BundleVerifyError::NotPrefixClosed {
                sequence: sequence.to_string(),
            });
        }
    }
    Ok(results.len())
}

/// `results.json` content for sequences already in canonical order.
#[must_use]
pub fn results_to_json(results: &[TermSequence]) -> serde_json::Value {
    serde_json::json!({
        "count": results.len(),
        "results": results.iter().map(TermSequence::to_json_value).collect::<Vec<_>>(),
        "schema_version": RESULTS_SCHEMA_VERSION,
    })
}

/// Parse `results.json` content.
///
/// # Errors
///
/// Returns [`BundleVerifyError::ResultsMalformed`] on a parse failure, a
/// schema mismatch, a wrong count, or results out of canonical order.
pub fn results_from_artifact(content: &[u8]) -> Result<Vec<TermSequence>, BundleVerifyError> {
    let malformed = |detail: String| BundleVerifyError::ResultsMalformed { detail };
    let value: serde_json::Value =
        serde_json::from_slice(content).map_err(|e| malformed(e.to_string()))?;
    if value["schema_version"].as_str() != Some(RESULTS_SCHEMA_VERSION) {
        return Err(malformed("schema_version mismatch".into()));
    }
    let entries = value["results"]
        .as_array()
        .ok_or_else(|| malformed("\"results\" is not an array".into()))?;
    let results = entries
        .iter()
        .map(TermSequence::from_json_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| malformed(e.to_string()))?;
    let count = value["count"].as_u64();
    if count != u64::try_from(results.len()).ok() {
        return Err(malformed(format!(
            "count {count:?} does not match {} results",
            results.len()
        )));
    }
    if results.windows(2).any(|w| w[0] >= w[1]) {
        return Err(malformed("results are not in strictly ascending order".into()));
    }
    Ok(results)
}

fn required<'a>(
    bundle: &'a ArtifactBundle,
    name: &str,
) -> Result<&'a BundleArtifact, BundleVerifyError> {
    bundle
        .artifact(name)
        .ok_or_else(|| BundleVerifyError::ArtifactMissing { name: name.into() })
}

fn verify_report_bindings(bundle: &ArtifactBundle) -> Result<(), BundleVerifyError> {
    let Some(report) = bundle.artifact(REPORT_FILENAME) else {
        return Ok(());
    };
    let policy = required(bundle, POLICY_FILENAME)?;
    let results = required(bundle, RESULTS_FILENAME)?;

    let report: serde_json::Value = serde_json::from_slice(&report.content).map_err(|e| {
        BundleVerifyError::ReportParseError {
            detail: e.to_string(),
        }
    })?;
    let field = |name: &str| {
        report[name]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BundleVerifyError::ReportFieldMissing { field: name.into() })
    };

    let declared = field("policy_digest")?;
    let recomputed = canonical_hash(HashDomain::SearchPolicy, &policy.content);
    if declared != recomputed.as_str() {
        return Err(BundleVerifyError::PolicyDigestMismatch {
            declared,
            recomputed: recomputed.as_str().to_string(),
        });
    }

    let declared = field("results_digest")?;
    let recomputed = canonical_hash(HashDomain::ResultSet, &results.content);
    if declared != recomputed.as_str() {
        return Err(BundleVerifyError::ResultsDigestMismatch {
            declared,
            recomputed: recomputed.as_str().to_string(),
        });
    }
    Ok(())
}

fn verify_results_log(bundle: &ArtifactBundle) -> Result<(), BundleVerifyError> {
    let (Some(results), Some(log)) = (
        bundle.artifact(RESULTS_FILENAME),
        bundle.artifact(RESULTS_LOG_FILENAME),
    ) else {
        return Ok(());
    };
    let results = results_from_artifact(&results.content)?;
    let text = std::str::from_utf8(&log.content).map_err(|e| {
        BundleVerifyError::ResultsLogMismatch {
            detail: e.to_string(),
        }
    })?;
    let mut logged = parse_results_log(text).map_err(|e| BundleVerifyError::ResultsLogMismatch {
        detail: e.to_string(),
    })?;
    logged.sort();
    if logged != results {
        return Err(BundleVerifyError::ResultsLogMismatch {
            detail: format!(
                "log holds {} sequences, results.json holds {}",
                logged.len(),
                results.len()
            ),
        });
    }
    Ok(())
}

fn compute_manifest_bytes(artifacts: &BTreeMap<String, BundleArtifact>) -> Result<Vec<u8>, String> {
    let manifest_artifacts: Vec<serde_json::Value> = artifacts
        .values()
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
                "normative": a.normative,
            })
        })
        .collect();
    let manifest_value = serde_json::json!({
        "artifacts": manifest_artifacts,
        "schema_version": "bundle.v1",
    });
    canonical_json_bytes(&manifest_value).map_err(|e| e.to_string())
}

fn compute_digest_basis_bytes(
    artifacts: &BTreeMap<String, BundleArtifact>,
) -> Result<Vec<u8>, String> {
    let normative_artifacts: Vec<serde_json::Value> = artifacts
        .values()
        .filter(|a| a.normative)
        .map(|a| {
            serde_json::json!({
                "content_hash": a.content_hash.as_str(),
                "name": a.name,
            })
        })
        .collect();
    let digest_basis_value = serde_json::json!({
        "artifacts": normative_artifacts,
        "schema_version": "bundle_digest_basis.v1",
    });
    canonical_json_bytes(&digest_basis_value).map_err(|e| e.to_string())
}

/// Parse, re-canonicalize, compare.
fn verify_canonical_json(bytes: &[u8]) -> Result<(), ()> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|_| ())?;
    let recanonized = canonical_json_bytes(&value).map_err(|_| ())?;
    if recanonized == bytes {
        Ok(())
    } else {
        Err(())
    }
}
