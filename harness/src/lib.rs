//! Trott Harness: sweeps, results logs and artifact bundles.
//!
//! The harness runs a configured search through `trott_search` and packages
//! the outcome as a self-contained bundle that can be verified and replayed
//! offline. It does NOT evaluate continued fractions itself; the validity
//! predicate lives in the kernel.
//!
//! - [`config::SweepConfig`] -- JSON sweep configuration and policy snapshot
//! - [`runner::run_sweep`] -- search, collect, sort, bundle
//! - [`results_log::ResultsLog`] -- JSON-lines sink
//! - [`bundle`] / [`bundle_dir`] -- in-memory and on-disk bundles

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bundle;
pub mod bundle_dir;
pub mod config;
pub mod results_log;
pub mod runner;
