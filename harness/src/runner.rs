//! Sweep runner: run a configured search and package it as a bundle.
//!
//! # Pipeline
//!
//! ```text
//! SweepConfig::validate()
//!   → search_with() | search_parallel_with()   (tee: results log + collector)
//!   → sort results into canonical order
//!   → policy.json, results.json, search_report.json, results.jsonl
//!   → build_bundle()
//! ```
//!
//! The normative artifacts depend only on the configuration, so two runs of
//! the same configuration produce the same bundle digest whatever the worker
//! scheduling was. `results.jsonl` keeps the actual report order and is
//! observational.

use std::path::Path;

use trott_kernel::cf::term::TermSequence;
use trott_kernel::digest::canon::canonical_json_bytes;
use trott_kernel::digest::hash::{canonical_hash, HashDomain};
use trott_search::contract::{BranchControl, ResultSink, SinkError};
use trott_search::error::SearchError;
use trott_search::node::Discovery;
use trott_search::parallel::search_parallel_with;
use trott_search::report::SearchReport;
use trott_search::search::search_with;
use trott_search::sink::AlwaysExpand;

use crate::bundle::{
    build_bundle, results_to_json, ArtifactBundle, BundleBuildError, POLICY_FILENAME,
    REPORT_FILENAME, REPORT_SCHEMA_VERSION, RESULTS_FILENAME, RESULTS_LOG_FILENAME,
};
use crate::bundle_dir::{write_bundle_dir, BundleDirWriteError};
use crate::config::{ConfigError, SweepConfig};
use crate::results_log::ResultsLog;

#[derive(Debug)]
pub enum SweepError {
    Config(ConfigError),
    Search(SearchError),
    CanonFailed { detail: String },
    BundleFailed(BundleBuildError),
    LogFailed { detail: String },
    PersistFailed(BundleDirWriteError),
}

impl std::fmt::Display for SweepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Search(e) => write!(f, "search: {e}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::BundleFailed(e) => write!(f, "bundle: {e}"),
            Self::LogFailed { detail } => write!(f, "results log: {detail}"),
            Self::PersistFailed(e) => write!(f, "bundle directory: {e}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::BundleFailed(e) => Some(e),
            Self::PersistFailed(e) => Some(e),
            Self::CanonFailed { .. } | Self::LogFailed { .. } => None,
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SearchError> for SweepError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

impl From<BundleBuildError> for SweepError {
    fn from(e: BundleBuildError) -> Self {
        Self::BundleFailed(e)
    }
}

/// Everything a finished sweep produced.
#[derive(Debug)]
pub struct SweepOutcome {
    /// Reported sequences in canonical (serial discovery) order.
    pub results: Vec<TermSequence>,
    pub report: SearchReport,
    pub bundle: ArtifactBundle,
}

/// Run `config` to exhaustion.
///
/// # Errors
///
/// See [`run_sweep_with`].
pub fn run_sweep(config: &SweepConfig) -> Result<SweepOutcome, SweepError> {
    run_sweep_with(config, &AlwaysExpand)
}

/// Run `config` under an explicit branch control.
///
/// A cancelled sweep still yields a bundle; its report records
/// `"termination":"cancelled"`.
///
/// # Errors
///
/// Returns [`SweepError`] if the configuration is invalid, the search fails,
/// or the bundle cannot be assembled.
pub fn run_sweep_with<C: BranchControl + ?Sized>(
    config: &SweepConfig,
    control: &C,
) -> Result<SweepOutcome, SweepError> {
    config.validate()?;
    tracing::info!(
        max_depth = config.search.max_depth,
        max_term = config.search.max_term,
        workers = config.parallel.map_or(0, |p| p.workers.get()),
        "sweep started"
    );

    let oracle = config.search.oracle();
    let mut sink = SweepSink {
        log: ResultsLog::new(Vec::new()),
        results: Vec::new(),
    };
    let report = match &config.parallel {
        Some(parallel) => {
            search_parallel_with(&config.search, parallel, &oracle, control, &mut sink)?
        }
        None => search_with(&config.search, &oracle, control, &mut sink)?,
    };

    let SweepSink { log, mut results } = sink;
    let log_bytes = log.finish().map_err(|e| SweepError::LogFailed {
        detail: e.to_string(),
    })?;
    results.sort();

    let bundle = build_sweep_bundle(config, &results, &report, log_bytes)?;
    tracing::info!(
        results = results.len(),
        termination = report.termination.as_str(),
        digest = %bundle.digest,
        "sweep finished"
    );
    Ok(SweepOutcome {
        results,
        report,
        bundle,
    })
}

/// [`run_sweep`], then write the bundle into `dir`.
///
/// # Errors
///
/// Everything [`run_sweep`] returns, plus [`SweepError::PersistFailed`].
pub fn run_sweep_to_dir(config: &SweepConfig, dir: &Path) -> Result<SweepOutcome, SweepError> {
    let outcome = run_sweep(config)?;
    write_bundle_dir(&outcome.bundle, dir).map_err(SweepError::PersistFailed)?;
    Ok(outcome)
}

/// Tees every discovery into the results log and the result list.
struct SweepSink {
    log: ResultsLog<Vec<u8>>,
    results: Vec<TermSequence>,
}

impl ResultSink for SweepSink {
    fn report(&mut self, discovery: &Discovery) -> Result<(), SinkError> {
        self.log.report(discovery)?;
        self.results.push(discovery.sequence.clone());
        Ok(())
    }
}

fn build_sweep_bundle(
    config: &SweepConfig,
    results: &[TermSequence],
    report: &SearchReport,
    log_bytes: Vec<u8>,
) -> Result<ArtifactBundle, SweepError> {
    let canon = |value: &serde_json::Value| {
        canonical_json_bytes(value).map_err(|e| SweepError::CanonFailed {
            detail: e.to_string(),
        })
    };
    let policy_bytes = canon(&config.to_json_value())?;
    let results_bytes = canon(&results_to_json(results))?;
    let report_bytes = canon(&serde_json::json!({
        "policy_digest": canonical_hash(HashDomain::SearchPolicy, &policy_bytes).as_str(),
        "report": report.to_json_value(),
        "results_digest": canonical_hash(HashDomain::ResultSet, &results_bytes).as_str(),
        "schema_version": REPORT_SCHEMA_VERSION,
    }))?;

    Ok(build_bundle(vec![
        (POLICY_FILENAME.into(), policy_bytes, true),
        (RESULTS_FILENAME.into(), results_bytes, true),
        (REPORT_FILENAME.into(), report_bytes, true),
        (RESULTS_LOG_FILENAME.into(), log_bytes, false),
    ])?)
}
