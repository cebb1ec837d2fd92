//! Sweep bundle persistence: write, read, and verify a bundle directory.
//!
//! ```text
//! <dir>/
//!   bundle_manifest.json       canonical JSON, every artifact
//!   bundle_digest_basis.json   canonical JSON, normative artifacts only
//!   bundle_digest.txt          "sha256:<hex>"
//!   policy.json                normative
//!   results.json               normative
//!   search_report.json         normative
//!   results.jsonl              observational
//! ```
//!
//! The directory path never enters a hash. Reading is fail-closed: missing
//! metadata, missing declared artifacts, undeclared extra files, an unknown
//! manifest schema, or a stored digest that does not match the digest basis
//! are all errors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use trott_kernel::digest::hash::{canonical_hash, ContentHash, HashDomain};

use crate::bundle::{
    replay_results, verify_bundle, ArtifactBundle, BundleArtifact, BundleVerifyError,
};

const MANIFEST_FILENAME: &str = "bundle_manifest.json";
const DIGEST_BASIS_FILENAME: &str = "bundle_digest_basis.json";
const DIGEST_FILENAME: &str = "bundle_digest.txt";

const METADATA_FILENAMES: &[&str] = &[MANIFEST_FILENAME, DIGEST_BASIS_FILENAME, DIGEST_FILENAME];

const TEMP_PREFIX: &str = ".tmp_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleDirWriteError {
    Io { detail: String },
    /// An artifact name would escape the bundle directory or collide with
    /// a metadata file.
    InvalidArtifactName { name: String },
}

impl std::fmt::Display for BundleDirWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::InvalidArtifactName { name } => write!(f, "invalid artifact name: {name:?}"),
        }
    }
}

impl std::error::Error for BundleDirWriteError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleDirReadError {
    Io { detail: String },
    MissingMetadata { filename: String },
    MissingArtifact { name: String },
    ExtraFile { name: String },
    ManifestParseError { detail: String },
    ManifestVersionMismatch { found: String },
    ManifestEntryInvalid { detail: String },
    /// `bundle_digest.txt` disagrees with the digest of the stored basis.
    DigestMismatch { stored: String, recomputed: String },
}

impl std::fmt::Display for BundleDirReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::MissingMetadata { filename } => write!(f, "missing metadata file: {filename}"),
            Self::MissingArtifact { name } => write!(f, "missing artifact: {name}"),
            Self::ExtraFile { name } => write!(f, "undeclared extra file: {name}"),
            Self::ManifestParseError { detail } => write!(f, "manifest parse error: {detail}"),
            Self::ManifestVersionMismatch { found } => {
                write!(f, "manifest version mismatch: {found:?}")
            }
            Self::ManifestEntryInvalid { detail } => write!(f, "manifest entry invalid: {detail}"),
            Self::DigestMismatch { stored, recomputed } => {
                write!(f, "digest mismatch: stored={stored}, recomputed={recomputed}")
            }
        }
    }
}

impl std::error::Error for BundleDirReadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleDirVerifyError {
    Read(BundleDirReadError),
    Verify(BundleVerifyError),
}

impl std::fmt::Display for BundleDirVerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read error: {e}"),
            Self::Verify(e) => write!(f, "verify error: {e}"),
        }
    }
}

impl std::error::Error for BundleDirVerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(e) => Some(e),
            Self::Verify(e) => Some(e),
        }
    }
}

/// Outcome of [`verify_bundle_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirVerification {
    pub digest: ContentHash,
    /// Number of reported sequences re-checked against the stored policy.
    pub replayed: usize,
}

/// Write `bundle` into `dir`, creating it if needed.
///
/// Every file goes through a temp file and a rename, so a reader never sees a
/// half-written artifact.
///
/// # Errors
///
/// Returns [`BundleDirWriteError`] on I/O failure or an artifact name that is
/// not a plain file name.
pub fn write_bundle_dir(bundle: &ArtifactBundle, dir: &Path) -> Result<(), BundleDirWriteError> {
    for name in bundle.artifacts.keys() {
        if !is_plain_file_name(name) || METADATA_FILENAMES.contains(&name.as_str()) {
            return Err(BundleDirWriteError::InvalidArtifactName { name: name.clone() });
        }
    }

    std::fs::create_dir_all(dir).map_err(|e| BundleDirWriteError::Io {
        detail: format!("create {}: {e}", dir.display()),
    })?;

    for artifact in bundle.artifacts.values() {
        write_atomic(dir, &artifact.name, &artifact.content)?;
    }
    write_atomic(dir, MANIFEST_FILENAME, &bundle.manifest)?;
    write_atomic(dir, DIGEST_BASIS_FILENAME, &bundle.digest_basis)?;
    write_atomic(dir, DIGEST_FILENAME, bundle.digest.as_str().as_bytes())?;

    tracing::debug!(
        dir = %dir.display(),
        artifacts = bundle.artifacts.len(),
        digest = %bundle.digest,
        "bundle directory written"
    );
    Ok(())
}

/// Load a bundle directory written by [`write_bundle_dir`].
///
/// # Errors
///
/// Returns [`BundleDirReadError`] on any fail-closed check.
pub fn read_bundle_dir(dir: &Path) -> Result<ArtifactBundle, BundleDirReadError> {
    let manifest = read_required(dir, MANIFEST_FILENAME)?;
    let digest_basis = read_required(dir, DIGEST_BASIS_FILENAME)?;
    let stored_digest = read_required(dir, DIGEST_FILENAME)?;

    let manifest_value: serde_json::Value =
        serde_json::from_slice(&manifest).map_err(|e| BundleDirReadError::ManifestParseError {
            detail: e.to_string(),
        })?;
    let schema_version = manifest_value["schema_version"].as_str().unwrap_or("");
    if schema_version != "bundle.v1" {
        return Err(BundleDirReadError::ManifestVersionMismatch {
            found: schema_version.to_string(),
        });
    }
    let entries = manifest_value["artifacts"].as_array().ok_or_else(|| {
        BundleDirReadError::ManifestParseError {
            detail: "\"artifacts\" is not an array".into(),
        }
    })?;

    let mut artifacts = BTreeMap::new();
    for entry in entries {
        let artifact = read_declared(dir, entry)?;
        artifacts.insert(artifact.name.clone(), artifact);
    }

    for filename in list_files(dir)? {
        let is_metadata = METADATA_FILENAMES.contains(&filename.as_str());
        if !is_metadata && !artifacts.contains_key(&filename) {
            return Err(BundleDirReadError::ExtraFile { name: filename });
        }
    }

    let recomputed = canonical_hash(HashDomain::BundleDigest, &digest_basis);
    let stored = String::from_utf8_lossy(&stored_digest).trim().to_string();
    if recomputed.as_str() != stored {
        return Err(BundleDirReadError::DigestMismatch {
            stored,
            recomputed: recomputed.as_str().to_string(),
        });
    }

    Ok(ArtifactBundle {
        artifacts,
        manifest,
        digest_basis,
        digest: recomputed,
    })
}

/// Offline verification: read `dir`, check bundle integrity, then replay
/// every reported sequence against the stored policy.
///
/// # Errors
///
/// Returns [`BundleDirVerifyError`] on the first failure.
pub fn verify_bundle_dir(dir: &Path) -> Result<DirVerification, BundleDirVerifyError> {
    let bundle = read_bundle_dir(dir).map_err(BundleDirVerifyError::Read)?;
    verify_bundle(&bundle).map_err(BundleDirVerifyError::Verify)?;
    let replayed = replay_results(&bundle).map_err(BundleDirVerifyError::Verify)?;
    tracing::info!(dir = %dir.display(), digest = %bundle.digest, replayed, "bundle verified");
    Ok(DirVerification {
        digest: bundle.digest,
        replayed,
    })
}

fn read_declared(
    dir: &Path,
    entry: &serde_json::Value,
) -> Result<BundleArtifact, BundleDirReadError> {
    let invalid = |detail: String| BundleDirReadError::ManifestEntryInvalid { detail };
    let name = entry["name"]
        .as_str()
        .ok_or_else(|| invalid("missing \"name\" field".into()))?
        .to_string();
    if !is_plain_file_name(&name) {
        return Err(invalid(format!("artifact name {name:?} is not a plain file name")));
    }
    let hash_str = entry["content_hash"]
        .as_str()
        .ok_or_else(|| invalid(format!("missing \"content_hash\" for {name}")))?;
    let content_hash = ContentHash::parse(hash_str)
        .ok_or_else(|| invalid(format!("invalid content_hash for {name}: {hash_str}")))?;
    let normative = entry["normative"]
        .as_bool()
        .ok_or_else(|| invalid(format!("missing \"normative\" for {name}")))?;
    let content = std::fs::read(dir.join(&name))
        .map_err(|_| BundleDirReadError::MissingArtifact { name: name.clone() })?;
    Ok(BundleArtifact {
        name,
        content,
        content_hash,
        normative,
    })
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with(TEMP_PREFIX)
        && !name.contains(['/', '\\'])
}

fn write_atomic(dir: &Path, name: &str, content: &[u8]) -> Result<(), BundleDirWriteError> {
    let temp_path = dir.join(format!("{TEMP_PREFIX}{name}"));
    let path = dir.join(name);
    std::fs::write(&temp_path, content).map_err(|e| BundleDirWriteError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, &path).map_err(|e| BundleDirWriteError::Io {
        detail: format!("rename {} to {}: {e}", temp_path.display(), path.display()),
    })
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, BundleDirReadError> {
    std::fs::read(dir.join(filename)).map_err(|_| BundleDirReadError::MissingMetadata {
        filename: filename.to_string(),
    })
}

/// Regular files in `dir`, excluding leftover temp files.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, BundleDirReadError> {
    let io = |e: std::io::Error| BundleDirReadError::Io {
        detail: format!("list {}: {e}", dir.display()),
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let entry = entry.map_err(io)?;
        if !entry.file_type().map_err(io)?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if name.starts_with(TEMP_PREFIX) => {}
            Ok(name) => {
                files.insert(name);
            }
            Err(raw) => {
                return Err(BundleDirReadError::ExtraFile {
                    name: raw.to_string_lossy().into_owned(),
                })
            }
        }
    }
    Ok(files)
}
